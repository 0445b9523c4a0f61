//! Per-event particle list.
//!
//! Particles are only ever appended. A particle removed by a cut keeps its
//! slot and is flagged through its status code, so the 1-based mother
//! indices of later entries stay valid.

use serde::{Deserialize, Serialize};

use crate::codes::StatusCode;
use crate::momentum::FourMomentum;

/// One particle line of an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleEntry {
    /// Particle type code.
    pub id: i32,
    /// Status code (incoming, outgoing, excluded).
    pub status: StatusCode,
    /// First and last mother, as 1-based indices into the same event.
    pub mothers: (u32, u32),
    /// Colour-flow tags. Not interpreted, only carried through.
    pub colour: (i32, i32),
    /// Four-momentum in GeV.
    pub momentum: FourMomentum,
    /// Invariant mass in GeV as written in the event file.
    pub mass: f64,
    /// Proper lifetime.
    pub lifetime: f64,
    /// Spin (cosine of the angle between spin and momentum).
    pub spin: f64,
}

impl ParticleEntry {
    /// A final-state secondary produced by a particle already in the event.
    ///
    /// `mother` is the 1-based index of the producing particle. Lifetime and
    /// spin are zero and there is no colour flow.
    pub fn secondary(id: i32, mother: u32, momentum: FourMomentum) -> Self {
        Self {
            id,
            status: StatusCode::FINAL,
            mothers: (mother, mother),
            colour: (0, 0),
            mass: momentum.mass(),
            momentum,
            lifetime: 0.0,
            spin: 0.0,
        }
    }
}

/// A single event: header values plus its ordered particle list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventRecord {
    /// Identifier of the generator process that produced the event.
    pub process_id: i32,
    /// Production weight (pb).
    pub weight: f64,
    /// Factorisation scale in GeV.
    pub scale: f64,
    /// QED coupling used for this event.
    pub aqed: f64,
    /// QCD coupling used for this event.
    pub aqcd: f64,
    /// Ordered particle list.
    pub particles: Vec<ParticleEntry>,
    /// Free-form annotation trailing the particle lines.
    pub annotation: String,
}

impl EventRecord {
    /// Number of particles in the event (NUP).
    pub const fn particle_count(&self) -> usize {
        self.particles.len()
    }

    /// Append a particle and return its 1-based index.
    ///
    /// Returns `None` only if the event already holds `u32::MAX` particles,
    /// in which case nothing is appended.
    pub fn push_particle(&mut self, entry: ParticleEntry) -> Option<u32> {
        let index = u32::try_from(self.particles.len()).ok()?.checked_add(1)?;
        self.particles.push(entry);
        Some(index)
    }

    /// Look up a particle by 1-based index.
    pub fn particle(&self, index: u32) -> Option<&ParticleEntry> {
        let zero_based = usize::try_from(index.checked_sub(1)?).ok()?;
        self.particles.get(zero_based)
    }
}
