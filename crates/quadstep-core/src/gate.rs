//! Trigger cooldown gate.
//!
//! Sub-tile movement means the player stays on the same tile for several
//! steps. Without a cooldown, touch events and damage floors under the player
//! would fire again on every one of those steps. The gate suppresses tile
//! triggers for a number of ticks after one fires.
//!
//! ```text
//!            fire (no NO_DELAY flag)
//!   Armed ─────────────────────────────▶ Cooling(n)
//!     ▲                                      │
//!     └──────────── tick() × n ──────────────┘
//! ```

use serde::{Deserialize, Serialize};

/// Observable state of a [`TriggerGate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GateState {
    /// Tile triggers may fire
    Armed,
    /// Tile triggers are suppressed for the given number of ticks
    Cooling(u32),
}

/// Cooldown counter guarding tile-touch triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TriggerGate {
    cooldown: u32,
}

impl TriggerGate {
    /// A gate in the armed state.
    #[must_use]
    pub const fn new() -> Self {
        Self { cooldown: 0 }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> GateState {
        if self.cooldown == 0 {
            GateState::Armed
        } else {
            GateState::Cooling(self.cooldown)
        }
    }

    /// Whether tile triggers may fire.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.cooldown == 0
    }

    /// Ticks left before the gate re-arms.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.cooldown
    }

    /// Start cooling for `frames` ticks, half that (rounded up) while dashing.
    ///
    /// Only an armed gate starts cooling; arming a cooling gate leaves the
    /// remaining count untouched.
    pub fn arm(&mut self, frames: u32, dashing: bool) {
        if self.is_armed() {
            self.cooldown = Self::delay_for(frames, dashing);
        }
    }

    /// Cooldown length for the given base delay.
    #[must_use]
    pub const fn delay_for(frames: u32, dashing: bool) -> u32 {
        if dashing {
            frames.div_ceil(2)
        } else {
            frames
        }
    }

    /// Advance one tick.
    pub fn tick(&mut self) {
        self.cooldown = self.cooldown.saturating_sub(1);
    }

    /// Drop any remaining cooldown.
    pub fn reset(&mut self) {
        self.cooldown = 0;
    }
}
