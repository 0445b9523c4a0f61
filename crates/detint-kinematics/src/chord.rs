//! Straight-line path of an incident particle through the detector box.

use detint_types::{FiducialVolume, FourMomentum, Vector3};

use crate::KinematicsError;

/// Segment of a straight trajectory inside the detector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Chord {
    /// Point where the trajectory enters the box.
    pub entry: Vector3,
    /// Unit direction of travel.
    pub direction: Vector3,
    /// Length of the segment inside the box, in metres.
    pub length: f64,
}

impl Chord {
    /// Trace the trajectory of `incident` from `entry` until it leaves
    /// `volume`.
    ///
    /// # Errors
    ///
    /// Returns [`KinematicsError::MissesVolume`] if the particle has no
    /// forward momentum, the entry point is outside the box, or the segment
    /// has zero length.
    pub fn trace(
        incident: &FourMomentum,
        volume: &FiducialVolume,
        entry: &Vector3,
    ) -> Result<Self, KinematicsError> {
        let misses = || KinematicsError::MissesVolume {
            x: entry.x,
            y: entry.y,
            z: entry.z,
        };

        let direction = incident.momentum().unit().ok_or_else(misses)?;
        if direction.z <= 0.0 || !volume.contains(*entry, 1e-9) {
            return Err(misses());
        }

        let length = [
            distance_to_face(entry.x, direction.x, volume.half_x()),
            distance_to_face(entry.y, direction.y, volume.half_y()),
            (volume.back_z() - entry.z) / direction.z,
        ]
        .into_iter()
        .fold(f64::INFINITY, f64::min);

        if !length.is_finite() {
            return Err(KinematicsError::NonFinite {
                quantity: "chord length",
            });
        }
        if length <= 0.0 {
            return Err(misses());
        }

        Ok(Self {
            entry: *entry,
            direction,
            length,
        })
    }

    /// Point at fraction `u` (in `[0, 1]`) of the way along the segment.
    pub fn point_at(&self, u: f64) -> Vector3 {
        self.entry + self.direction * (u.clamp(0.0, 1.0) * self.length)
    }
}

/// Distance along one transverse axis before leaving `[-half, half]`.
fn distance_to_face(position: f64, direction: f64, half: f64) -> f64 {
    if direction > 0.0 {
        ((half - position) / direction).max(0.0)
    } else if direction < 0.0 {
        ((-half - position) / direction).max(0.0)
    } else {
        f64::INFINITY
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn volume() -> FiducialVolume {
        FiducialVolume::new(2.0, 2.0, 1.0, 10.0).unwrap()
    }

    #[test]
    fn on_axis_track_crosses_full_depth() {
        let p = FourMomentum::new(0.0, 0.0, 1.0, 1.1);
        let chord = Chord::trace(&p, &volume(), &Vector3::new(0.0, 0.0, 10.0)).unwrap();
        assert!((chord.length - 1.0).abs() < 1e-12);
        let mid = chord.point_at(0.5);
        assert!((mid.z - 10.5).abs() < 1e-12);
    }

    #[test]
    fn tilted_track_leaves_through_the_side() {
        // slope 0.09 enters at x = 0.9 and leaves x = 1.0 after dz = 1.111..
        // which is past the back face, so the back face wins.
        let p = FourMomentum::new(0.09, 0.0, 1.0, 1.1);
        let entry = Vector3::new(0.9, 0.0, 10.0);
        let chord = Chord::trace(&p, &volume(), &entry).unwrap();
        let exit = chord.point_at(1.0);
        assert!((exit.z - 11.0).abs() < 1e-9);

        // a steeper track from the same point exits through x = 1.
        let steep = FourMomentum::new(0.5, 0.0, 1.0, 1.2);
        let chord = Chord::trace(&steep, &volume(), &entry).unwrap();
        let exit = chord.point_at(1.0);
        assert!((exit.x - 1.0).abs() < 1e-9);
        assert!(exit.z < 11.0);
    }

    #[test]
    fn backward_track_misses() {
        let p = FourMomentum::new(0.0, 0.0, -1.0, 1.1);
        let result = Chord::trace(&p, &volume(), &Vector3::new(0.0, 0.0, 10.0));
        assert!(matches!(result, Err(KinematicsError::MissesVolume { .. })));
    }

    #[test]
    fn entry_outside_the_box_misses() {
        let p = FourMomentum::new(0.0, 0.0, 1.0, 1.1);
        let result = Chord::trace(&p, &volume(), &Vector3::new(3.0, 0.0, 10.0));
        assert!(result.is_err());
    }
}
