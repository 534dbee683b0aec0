//! Host abstraction layer
//!
//! Handles the pieces the simulation core only sees through interfaces:
//! - Fixed-step timing from variable frame deltas
//! - The player collaborator (position, stop, reset)
//! - A headless demo player for native runs

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::sim::ring::RingPosition;

/// Turns variable frame times into fixed simulation steps
#[derive(Debug, Clone, Default)]
pub struct FixedStep {
    accumulator: f32,
}

impl FixedStep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a frame's elapsed time; returns how many `SIM_DT` steps to run.
    /// Long frames are capped so a stall can't snowball.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.clamp(0.0, 0.1);

        let mut steps = 0;
        while self.accumulator >= SIM_DT && steps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            steps += 1;
        }
        if steps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        steps
    }

    /// Leftover fraction of a step, for render interpolation
    pub fn alpha(&self) -> f32 {
        self.accumulator / SIM_DT
    }
}

/// Direction of a player jump across the ring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JumpDirection {
    /// Counterclockwise neighbour
    Left,
    /// Same ring position
    Forward,
    /// Clockwise neighbour
    Right,
}

impl JumpDirection {
    /// Ring position reached by jumping this way from `from`
    pub fn target(self, from: RingPosition) -> RingPosition {
        match self {
            JumpDirection::Left => from.advance(false),
            JumpDirection::Forward => from,
            JumpDirection::Right => from.advance(true),
        }
    }

    /// Direction that leads from `from` to the adjacent `to`
    pub fn between(from: RingPosition, to: RingPosition) -> Option<Self> {
        [JumpDirection::Left, JumpDirection::Forward, JumpDirection::Right]
            .into_iter()
            .find(|d| d.target(from) == to)
    }
}

/// The player as the game loop sees it
pub trait Player {
    /// Position along the forward axis
    fn forward_position(&self) -> f32;

    /// Height above the platform surface plane
    fn vertical_position(&self) -> f32;

    /// Kill all motion (death)
    fn stop(&mut self);

    /// Back to the start position, at rest
    fn reset_to_start(&mut self);
}

/// Standing height of the demo player
pub const DEMO_STAND_HEIGHT: f32 = 1.0;
const DEMO_GRAVITY: f32 = 19.6;
const DEMO_JUMP_IMPULSE: f32 = 8.0;

/// Minimal ballistic player for headless runs
#[derive(Debug, Clone)]
pub struct DemoPlayer {
    start_z: f32,
    z: f32,
    y: f32,
    vy: f32,
    ring: RingPosition,
    start_ring: RingPosition,
    grounded: bool,
    stopped: bool,
}

impl DemoPlayer {
    pub fn new(start_z: f32, start_ring: RingPosition) -> Self {
        Self {
            start_z,
            z: start_z,
            y: DEMO_STAND_HEIGHT,
            vy: 0.0,
            ring: start_ring,
            start_ring,
            grounded: true,
            stopped: false,
        }
    }

    pub fn ring(&self) -> RingPosition {
        self.ring
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    /// Jump toward a neighbouring ring position; ignored while airborne
    pub fn jump(&mut self, direction: JumpDirection) -> bool {
        if !self.grounded || self.stopped {
            return false;
        }
        self.ring = direction.target(self.ring);
        self.vy = DEMO_JUMP_IMPULSE;
        self.grounded = false;
        true
    }

    /// Integrate one step. `supported` says whether a platform is under the
    /// player's ring position. Returns true on touchdown.
    pub fn step(&mut self, dt: f32, supported: bool) -> bool {
        if self.stopped {
            return false;
        }

        if self.grounded {
            if supported {
                return false;
            }
            // Walked off an edge
            self.grounded = false;
        }

        self.vy -= DEMO_GRAVITY * dt;
        let next_y = self.y + self.vy * dt;

        if supported && self.vy <= 0.0 && self.y >= DEMO_STAND_HEIGHT && next_y <= DEMO_STAND_HEIGHT {
            self.y = DEMO_STAND_HEIGHT;
            self.vy = 0.0;
            self.grounded = true;
            return true;
        }

        self.y = next_y;
        false
    }
}

impl Player for DemoPlayer {
    fn forward_position(&self) -> f32 {
        self.z
    }

    fn vertical_position(&self) -> f32 {
        self.y
    }

    fn stop(&mut self) {
        self.vy = 0.0;
        self.stopped = true;
    }

    fn reset_to_start(&mut self) {
        *self = Self::new(self.start_z, self.start_ring);
    }
}
