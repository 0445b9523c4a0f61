//! Per-event contribution and the run-level total.
//!
//! Each event contributes `weight × accepted × multiplier × 1e-36`. The
//! contributions are summed as they come, and the exposure normalisation is
//! applied once, in [`WeightAccumulator::finish`].

use serde::Serialize;

/// Conversion from the production weight unit (pb) to cm^2.
pub const PICOBARN_TO_CM2: f64 = 1e-36;

/// Contribution of one event to the run total.
///
/// `accepted` is the number of geometrically accepted candidates (0, 1 or
/// 2) and multiplies the contribution as is.
pub fn event_contribution(weight: f64, accepted: u8, multiplier: f64) -> f64 {
    weight * f64::from(accepted) * multiplier * PICOBARN_TO_CM2
}

/// Running sum of event contributions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightAccumulator {
    total: f64,
    events: u64,
}

impl WeightAccumulator {
    /// An empty accumulator.
    pub const fn new() -> Self {
        Self {
            total: 0.0,
            events: 0,
        }
    }

    /// Fold one event's contribution into the total.
    pub fn add(&mut self, contribution: f64) {
        self.total += contribution;
        self.events = self.events.saturating_add(1);
    }

    /// Sum of contributions so far, before exposure normalisation.
    pub const fn total(&self) -> f64 {
        self.total
    }

    /// Number of events folded in.
    pub const fn events(&self) -> u64 {
        self.events
    }

    /// Close the run, scaling the total by `exposure_factor` (NDUMP × LDUMP).
    pub fn finish(self, exposure_factor: f64) -> ExposureTotal {
        ExposureTotal {
            raw_total: self.total,
            events: self.events,
            exposure_factor,
            events_per_exposure: self.total * exposure_factor,
        }
    }
}

/// Run-level result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExposureTotal {
    /// Sum of event contributions.
    pub raw_total: f64,
    /// Number of events analysed.
    pub events: u64,
    /// NDUMP × LDUMP.
    pub exposure_factor: f64,
    /// Expected signal events per unit exposure (EOT).
    pub events_per_exposure: f64,
}
