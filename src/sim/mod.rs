//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Injected RNG only (seeded or scripted)
//! - Stable iteration order (lane slot, then platform handle)
//! - No rendering, audio or storage dependencies beyond traits

pub mod generator;
pub mod path;
pub mod random;
pub mod ring;
pub mod spawner;
pub mod state;
pub mod tick;

pub use generator::{GenerationClock, PRIMARY, PassReport, PrefillSummary, TrackGenerator, TrackTuning};
pub use path::PathState;
pub use random::{RandomPolicy, ScriptedRandom, SeededRandom};
pub use ring::RingPosition;
pub use spawner::{Platform, PlatformColor, PlatformHandle, PlatformSpawner, SpawnLayout};
pub use state::{GameClock, GameEvent, GamePhase, GameState, PauseReason, Resume};
pub use tick::{GameLoop, TickInput};
