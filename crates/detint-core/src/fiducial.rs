//! Geometric acceptance of candidate particles.
//!
//! A candidate travelling in a straight line from the origin hits the
//! detector front face when both `|px/pz| < lx/(2·ldet)` and
//! `|py/pz| < ly/(2·ldet)`. At most [`MAX_ACCEPTED`] candidates are accepted
//! per event; later ones are rejected whatever their direction.

use detint_types::{FiducialVolume, FourMomentum, GeometryError, RunHeader, Vector3};

/// Most candidates accepted in one event.
pub const MAX_ACCEPTED: u8 = 2;

/// Why a candidate was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    /// The trajectory misses the front face.
    OutsideAcceptance,
    /// Two candidates were already accepted in this event.
    Saturated,
    /// `pz == 0`, the slope is undefined.
    ZeroLongitudinalMomentum,
    /// The slope is not a finite number.
    NonFiniteMomentum,
    /// The header geometry is unusable.
    InvalidGeometry(GeometryError),
}

/// Verdict for one candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum Acceptance {
    /// The candidate hits the detector.
    Accepted {
        /// 1 for the first accepted candidate of the event, 2 for the second.
        ordinal: u8,
        /// Where the trajectory crosses the front face.
        entry: Vector3,
    },
    /// The candidate is excluded.
    Rejected(Rejection),
}

/// Event-scoped count of accepted candidates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AcceptanceCounter {
    accepted: u8,
}

impl AcceptanceCounter {
    /// A counter for a fresh event.
    pub const fn new() -> Self {
        Self { accepted: 0 }
    }

    /// Number of candidates accepted so far (0, 1 or 2).
    pub const fn accepted(&self) -> u8 {
        self.accepted
    }

    /// Whether no further candidate may be accepted.
    pub const fn is_saturated(&self) -> bool {
        self.accepted >= MAX_ACCEPTED
    }
}

/// Acceptance test against the run's detector box.
#[derive(Debug, Clone, PartialEq)]
pub struct FiducialFilter {
    geometry: Result<FiducialVolume, GeometryError>,
}

impl FiducialFilter {
    /// A filter over an already validated (or invalid) geometry.
    pub const fn new(geometry: Result<FiducialVolume, GeometryError>) -> Self {
        Self { geometry }
    }

    /// A filter over the geometry described by the run header.
    pub fn from_header(header: &RunHeader) -> Self {
        Self::new(header.geometry())
    }

    /// The detector box, if the geometry is valid.
    pub fn volume(&self) -> Option<&FiducialVolume> {
        self.geometry.as_ref().ok()
    }

    /// What is wrong with the geometry, if anything.
    pub fn geometry_error(&self) -> Option<&GeometryError> {
        self.geometry.as_ref().err()
    }

    /// Classify one candidate, updating the event's counter on acceptance.
    pub fn classify(
        &self,
        counter: &mut AcceptanceCounter,
        momentum: &FourMomentum,
    ) -> Acceptance {
        let volume = match &self.geometry {
            Ok(volume) => volume,
            Err(err) => return Acceptance::Rejected(Rejection::InvalidGeometry(err.clone())),
        };
        if counter.is_saturated() {
            return Acceptance::Rejected(Rejection::Saturated);
        }
        if momentum.pz == 0.0 {
            return Acceptance::Rejected(Rejection::ZeroLongitudinalMomentum);
        }

        let slope_x = momentum.px / momentum.pz;
        let slope_y = momentum.py / momentum.pz;
        if !(slope_x.is_finite() && slope_y.is_finite()) {
            return Acceptance::Rejected(Rejection::NonFiniteMomentum);
        }
        if !(slope_x.abs() < volume.max_slope_x() && slope_y.abs() < volume.max_slope_y()) {
            return Acceptance::Rejected(Rejection::OutsideAcceptance);
        }

        counter.accepted = counter.accepted.saturating_add(1);
        let ldet = volume.front_z();
        Acceptance::Accepted {
            ordinal: counter.accepted,
            entry: Vector3::new(slope_x * ldet, slope_y * ldet, ldet),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn filter() -> FiducialFilter {
        FiducialFilter::new(FiducialVolume::new(2.0, 2.0, 1.0, 10.0))
    }

    fn momentum(px: f64, py: f64, pz: f64) -> FourMomentum {
        FourMomentum::new(px, py, pz, 1.0)
    }

    #[test]
    fn accepts_inside_and_projects_entry_point() {
        let mut counter = AcceptanceCounter::new();
        let verdict = filter().classify(&mut counter, &momentum(0.05, 0.05, 1.0));
        assert!(matches!(verdict, Acceptance::Accepted { ordinal: 1, .. }));
        if let Acceptance::Accepted { entry, .. } = verdict {
            assert!((entry.x - 0.5).abs() < 1e-12);
            assert!((entry.y - 0.5).abs() < 1e-12);
            assert!((entry.z - 10.0).abs() < 1e-12);
        }
        assert_eq!(counter.accepted(), 1);
    }

    #[test]
    fn boundary_slope_is_rejected() {
        // |px/pz| == lx/(2 ldet) exactly is not strictly inside.
        let mut counter = AcceptanceCounter::new();
        let verdict = filter().classify(&mut counter, &momentum(0.1, 0.0, 1.0));
        assert_eq!(verdict, Acceptance::Rejected(Rejection::OutsideAcceptance));
        assert_eq!(counter.accepted(), 0);
    }

    #[test]
    fn either_axis_can_reject() {
        let mut counter = AcceptanceCounter::new();
        assert_eq!(
            filter().classify(&mut counter, &momentum(0.0, -0.2, 1.0)),
            Acceptance::Rejected(Rejection::OutsideAcceptance)
        );
        assert_eq!(
            filter().classify(&mut counter, &momentum(0.3, 0.0, 1.0)),
            Acceptance::Rejected(Rejection::OutsideAcceptance)
        );
    }

    #[test]
    fn zero_pz_is_rejected_without_counting() {
        let mut counter = AcceptanceCounter::new();
        let verdict = filter().classify(&mut counter, &momentum(0.0, 0.0, 0.0));
        assert_eq!(
            verdict,
            Acceptance::Rejected(Rejection::ZeroLongitudinalMomentum)
        );
        assert_eq!(counter.accepted(), 0);
    }

    #[test]
    fn nan_momentum_is_rejected() {
        let mut counter = AcceptanceCounter::new();
        let verdict = filter().classify(&mut counter, &momentum(f64::NAN, 0.0, 1.0));
        assert_eq!(verdict, Acceptance::Rejected(Rejection::NonFiniteMomentum));
    }

    #[test]
    fn third_candidate_is_always_rejected() {
        let mut counter = AcceptanceCounter::new();
        let f = filter();
        let inside = momentum(0.01, 0.01, 1.0);
        assert!(matches!(
            f.classify(&mut counter, &inside),
            Acceptance::Accepted { ordinal: 1, .. }
        ));
        assert!(matches!(
            f.classify(&mut counter, &inside),
            Acceptance::Accepted { ordinal: 2, .. }
        ));
        assert_eq!(
            f.classify(&mut counter, &inside),
            Acceptance::Rejected(Rejection::Saturated)
        );
        assert_eq!(counter.accepted(), MAX_ACCEPTED);
    }

    #[test]
    fn invalid_geometry_rejects_everything() {
        let f = FiducialFilter::new(FiducialVolume::new(0.0, 2.0, 1.0, 10.0));
        assert!(f.volume().is_none());
        assert!(f.geometry_error().is_some());
        let mut counter = AcceptanceCounter::new();
        assert!(matches!(
            f.classify(&mut counter, &momentum(0.0, 0.0, 1.0)),
            Acceptance::Rejected(Rejection::InvalidGeometry(_))
        ));
    }
}
