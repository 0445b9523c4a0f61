//! Append-only staging buffer with stepped capacity growth.
//!
//! A [`Branch`] owns a named sequence of rows. Appending to a full branch
//! asks its [`GrowthPolicy`] for a larger capacity and reserves exactly that
//! much; if the policy refuses or the allocation fails, the append is
//! rejected with [`BufferError::CapacityExhausted`] and the branch is left
//! unchanged. Clearing keeps the capacity for reuse by the next event.

use crate::error::BufferError;
use crate::growth::{GrowthPolicy, SteppedGrowth};

/// Capacity of a branch before its first growth step.
pub const INITIAL_CAPACITY: usize = 1;

/// Named, growable buffer of rows.
#[derive(Debug, Clone)]
pub struct Branch<T, P = SteppedGrowth> {
    name: String,
    entries: Vec<T>,
    capacity: usize,
    policy: P,
}

impl<T> Branch<T> {
    /// Create an empty branch with the default stepped growth.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_policy(name, SteppedGrowth)
    }
}

impl<T, P: GrowthPolicy> Branch<T, P> {
    /// Create an empty branch with a custom growth policy.
    pub fn with_policy(name: impl Into<String>, policy: P) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
            capacity: INITIAL_CAPACITY,
            policy,
        }
    }

    /// Append `value` and return a mutable reference to the stored row.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::CapacityExhausted`] if the branch is full and
    /// cannot grow.
    pub fn new_entry(&mut self, value: T) -> Result<&mut T, BufferError> {
        if self.entries.len() >= self.capacity {
            self.grow()?;
        }
        let index = self.entries.len();
        self.entries.push(value);
        self.entries
            .get_mut(index)
            .ok_or_else(|| BufferError::CapacityExhausted {
                branch: self.name.clone(),
                capacity: self.capacity,
            })
    }

    /// Drop every row, keeping the capacity.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Name of the branch.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of rows currently staged.
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no rows are staged.
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current logical capacity.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate over the staged rows in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }

    /// Staged rows as a slice.
    pub const fn as_slice(&self) -> &[T] {
        self.entries.as_slice()
    }

    fn grow(&mut self) -> Result<(), BufferError> {
        let Some(next) = self
            .policy
            .next_capacity(self.capacity)
            .filter(|next| *next > self.capacity)
        else {
            return Err(self.exhausted());
        };
        let additional = next.saturating_sub(self.entries.len());
        if self.entries.try_reserve_exact(additional).is_err() {
            return Err(self.exhausted());
        }
        tracing::trace!(
            branch = %self.name,
            from = self.capacity,
            to = next,
            "branch grown"
        );
        self.capacity = next;
        Ok(())
    }

    fn exhausted(&self) -> BufferError {
        BufferError::CapacityExhausted {
            branch: self.name.clone(),
            capacity: self.capacity,
        }
    }
}

impl<'a, T, P> IntoIterator for &'a Branch<T, P> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
