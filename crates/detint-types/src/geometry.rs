//! Detector geometry.
//!
//! The detector is a box aligned with the beam axis. Its front face is
//! centred on the axis at `z = ldet`; it extends `lx` by `ly` transversely
//! and `lz` in depth. All lengths are in metres.

use serde::Serialize;

use crate::momentum::Vector3;

/// Errors describing an unusable detector geometry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    /// A dimension is zero, negative, or not a finite number.
    #[error("detector dimension {name} must be positive and finite, got {value}")]
    NonPositiveDimension {
        /// Header key of the offending dimension.
        name: &'static str,
        /// The value found in the header.
        value: f64,
    },
}

/// The detector's fiducial box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FiducialVolume {
    half_x: f64,
    half_y: f64,
    depth: f64,
    front_z: f64,
}

impl FiducialVolume {
    /// Build the box from the full transverse widths, the depth, and the
    /// distance of the front face from the production point.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::NonPositiveDimension`] for the first
    /// dimension that is not strictly positive and finite.
    pub fn new(lx: f64, ly: f64, lz: f64, ldet: f64) -> Result<Self, GeometryError> {
        for (name, value) in [("lx", lx), ("ly", ly), ("lz", lz), ("ldet", ldet)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(GeometryError::NonPositiveDimension { name, value });
            }
        }
        Ok(Self {
            half_x: lx / 2.0,
            half_y: ly / 2.0,
            depth: lz,
            front_z: ldet,
        })
    }

    /// Half-width along x.
    pub const fn half_x(&self) -> f64 {
        self.half_x
    }

    /// Half-width along y.
    pub const fn half_y(&self) -> f64 {
        self.half_y
    }

    /// Depth along the beam axis.
    pub const fn depth(&self) -> f64 {
        self.depth
    }

    /// Distance from the production point to the front face.
    pub const fn front_z(&self) -> f64 {
        self.front_z
    }

    /// z coordinate of the back face.
    pub fn back_z(&self) -> f64 {
        self.front_z + self.depth
    }

    /// Maximum `|px/pz|` of a straight track that hits the front face.
    pub fn max_slope_x(&self) -> f64 {
        self.half_x / self.front_z
    }

    /// Maximum `|py/pz|` of a straight track that hits the front face.
    pub fn max_slope_y(&self) -> f64 {
        self.half_y / self.front_z
    }

    /// Whether a point lies inside the box (faces included), with a small
    /// absolute tolerance for points computed on a face.
    pub fn contains(&self, point: Vector3, tolerance: f64) -> bool {
        point.x.abs() <= self.half_x + tolerance
            && point.y.abs() <= self.half_y + tolerance
            && point.z >= self.front_z - tolerance
            && point.z <= self.back_z() + tolerance
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn slopes_follow_half_width_over_distance() {
        let volume = FiducialVolume::new(2.0, 4.0, 1.0, 10.0).unwrap();
        assert!((volume.max_slope_x() - 0.1).abs() < 1e-12);
        assert!((volume.max_slope_y() - 0.2).abs() < 1e-12);
        assert!((volume.back_z() - 11.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_non_positive_dimensions() {
        let err = FiducialVolume::new(2.0, 0.0, 1.0, 10.0);
        assert!(matches!(
            err,
            Err(GeometryError::NonPositiveDimension { name: "ly", .. })
        ));
        assert!(FiducialVolume::new(2.0, 2.0, -1.0, 10.0).is_err());
        assert!(FiducialVolume::new(2.0, 2.0, 1.0, f64::NAN).is_err());
    }

    #[test]
    fn contains_checks_all_faces() {
        let volume = FiducialVolume::new(2.0, 2.0, 1.0, 10.0).unwrap();
        assert!(volume.contains(Vector3::new(0.0, 0.0, 10.5), 0.0));
        assert!(volume.contains(Vector3::new(1.0, -1.0, 10.0), 1e-12));
        assert!(!volume.contains(Vector3::new(1.1, 0.0, 10.5), 1e-12));
        assert!(!volume.contains(Vector3::new(0.0, 0.0, 11.5), 1e-12));
    }
}
