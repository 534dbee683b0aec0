//! Per-lane state
//!
//! Exactly three lane slots exist. Slot 0 is the primary lane: active from
//! generator construction and never deactivated. Slots 1 and 2 start inactive,
//! are switched on by a branch and switched off again by a collapse.

use serde::{Deserialize, Serialize};

use super::ring::RingPosition;

/// State of one lane slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathState {
    /// Whether this lane currently produces platforms
    pub active: bool,
    /// Set by the branch that created the lane. The lane neither spawns nor
    /// picks a target during that pass; it picks one and clears the flag on
    /// the following pass.
    pub just_activated: bool,
    pub current: RingPosition,
    pub last: RingPosition,
    /// Where this lane will spawn its next platform
    pub next: RingPosition,
    /// Platforms this lane has spawned since it was (re)activated
    #[serde(default)]
    pub spawned: u32,
}

impl PathState {
    /// Primary lane anchored at `start`
    pub fn primary(start: RingPosition) -> Self {
        Self {
            active: true,
            just_activated: false,
            current: start,
            last: start,
            next: start,
            spawned: 0,
        }
    }

    pub fn inactive() -> Self {
        Self {
            active: false,
            just_activated: false,
            current: RingPosition::default(),
            last: RingPosition::default(),
            next: RingPosition::default(),
            spawned: 0,
        }
    }

    /// Active and not waiting out its first pass
    #[inline]
    pub fn is_settled(&self) -> bool {
        self.active && !self.just_activated
    }

    /// Turn this slot into a branch starting where `source` currently is.
    ///
    /// The new lane has no target of its own yet, so `next` mirrors
    /// `current` until the pass picks one.
    pub fn branch_from(&mut self, source: &PathState) {
        self.active = true;
        self.just_activated = true;
        self.current = source.current;
        self.last = source.last;
        self.next = source.current;
        self.spawned = 0;
    }

    /// Record a spawn at `next` and shift the position history
    pub fn shift(&mut self) {
        self.last = self.current;
        self.current = self.next;
        self.spawned += 1;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.just_activated = false;
    }
}

impl Default for PathState {
    fn default() -> Self {
        Self::inactive()
    }
}
