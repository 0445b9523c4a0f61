//! Capacity growth policies.

/// Decides the next capacity of a full buffer.
pub trait GrowthPolicy {
    /// Capacity to grow to from `current`, or `None` if the buffer cannot
    /// grow any further. The result must exceed `current`.
    fn next_capacity(&self, current: usize) -> Option<usize>;
}

/// Grow through 10, 30, 100 and 250 entries, then double.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SteppedGrowth;

impl GrowthPolicy for SteppedGrowth {
    fn next_capacity(&self, current: usize) -> Option<usize> {
        match current {
            0..10 => Some(10),
            10..30 => Some(30),
            30..100 => Some(100),
            100..250 => Some(250),
            _ => current.checked_mul(2),
        }
    }
}

/// Grow by a fixed number of entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearGrowth {
    /// Entries added per step. Zero is treated as one.
    pub step: usize,
}

impl GrowthPolicy for LinearGrowth {
    fn next_capacity(&self, current: usize) -> Option<usize> {
        current.checked_add(self.step.max(1))
    }
}
