//! Octa Runner - procedural track core for an octagonal endless runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (lanes, platforms, game loop)
//! - `platform`: Host abstraction (fixed-step driver, player collaborator)
//! - `persistence`: Best-score storage
//! - `settings`: Data-driven tuning, loaded once at construction

pub mod audio;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod ui;

pub use highscores::BestScore;
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Number of discrete positions on the platform ring
    pub const RING_SLOTS: usize = 8;
    /// Maximum number of concurrent lanes (primary included)
    pub const MAX_PATHS: usize = 3;

    /// Live-spawned platforms slide in from this multiple of the ring radius
    pub const TRANSIT_RADIUS_FACTOR: f32 = 2.5;
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}
