//! Game settings and tuning
//!
//! Read once at construction. Missing or malformed files fall back to
//! defaults, and nonsensical values are clamped rather than rejected.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::persistence::StoreError;
use crate::sim::generator::TrackTuning;
use crate::sim::ring::RingPosition;
use crate::sim::spawner::SpawnLayout;

/// Game settings/tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Speed progression ===
    /// Platform speed at run start (units/s)
    pub start_speed: f32,
    /// Successful landings between speed steps
    pub landings_per_speed_step: u32,
    /// Speed added per step
    pub speed_increment: f32,

    // === Gaps and platforms ===
    pub min_gap: f32,
    pub max_gap: f32,
    /// Added to both gap bounds per speed step
    pub gap_widen_per_step: f32,
    /// Platform length bounds
    pub min_scale: f32,
    pub max_scale: f32,
    /// Percent chance per spawn that a lane branches
    pub branch_chance: u32,
    /// Percent chance a lane turns clockwise
    pub clockwise_chance: u32,
    pub starting_ring_position: RingPosition,

    // === World layout ===
    pub ring_radius: f32,
    /// Where live platforms appear
    pub spawn_z: f32,
    /// Player's forward position
    pub player_z: f32,
    /// Platforms are destroyed past this
    pub despawn_z: f32,
    /// First pre-filled platform (world z)
    pub terrain_start_z: f32,
    /// Slide-in duration for live platforms
    pub transit_secs: f32,

    // === Game loop ===
    /// Player dies below this height
    pub death_height: f32,
    /// Minimum time between run starts
    pub restart_cooldown_secs: f32,
    /// Time on the death screen before returning to menu
    pub death_cooldown_secs: f32,
    /// Resume countdown after an involuntary pause
    pub countdown_secs: u32,
    /// Speed ramp duration after the countdown
    pub resume_ramp_secs: f32,

    /// RNG seed for the run
    pub seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            start_speed: 6.0,
            landings_per_speed_step: 5,
            speed_increment: 0.8,

            min_gap: 0.5,
            max_gap: 1.5,
            gap_widen_per_step: 0.1,
            min_scale: 2.0,
            max_scale: 4.0,
            branch_chance: 30,
            clockwise_chance: 50,
            starting_ring_position: RingPosition::Bot,

            ring_radius: 2.0,
            spawn_z: 60.0,
            player_z: 0.0,
            despawn_z: -10.0,
            terrain_start_z: -1.0,
            transit_secs: 1.0,

            death_height: 0.6,
            restart_cooldown_secs: 1.0,
            death_cooldown_secs: 1.0,
            countdown_secs: 3,
            resume_ramp_secs: 1.5,

            seed: 0x0C7A_5EED,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file, defaults on any failure
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings.sanitized()
            }
            Err(e) => {
                log::warn!("Using default settings ({}): {}", path.display(), e);
                Self::default()
            }
        }
    }

    fn try_load(path: &Path) -> Result<Self, StoreError> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Save settings as pretty JSON
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Copy with nonsensical values clamped into range
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let mut s = self.clone();

        if !(s.start_speed > 0.0) {
            s.start_speed = defaults.start_speed;
        }
        s.landings_per_speed_step = s.landings_per_speed_step.max(1);
        s.speed_increment = s.speed_increment.max(0.0);
        s.min_gap = s.min_gap.max(0.0);
        s.max_gap = s.max_gap.max(s.min_gap);
        s.gap_widen_per_step = s.gap_widen_per_step.max(0.0);
        s.min_scale = s.min_scale.max(0.1);
        s.max_scale = s.max_scale.max(s.min_scale);
        s.branch_chance = s.branch_chance.min(100);
        s.clockwise_chance = s.clockwise_chance.min(100);
        s.ring_radius = s.ring_radius.max(0.0);
        s.transit_secs = s.transit_secs.max(0.0);
        s.resume_ramp_secs = s.resume_ramp_secs.max(0.0);
        if s.spawn_z <= s.player_z {
            s.spawn_z = s.player_z + defaults.spawn_z - defaults.player_z;
        }
        if s.despawn_z >= s.player_z {
            s.despawn_z = s.player_z + defaults.despawn_z - defaults.player_z;
        }
        s.terrain_start_z = s.terrain_start_z.clamp(s.despawn_z, s.player_z);
        s
    }

    /// Generator tuning derived from these settings
    pub fn track_tuning(&self) -> TrackTuning {
        TrackTuning {
            start_speed: self.start_speed,
            min_gap: self.min_gap,
            max_gap: self.max_gap,
            min_scale: self.min_scale,
            max_scale: self.max_scale,
            speed_increment: self.speed_increment,
            gap_widen_per_step: self.gap_widen_per_step,
            branch_chance: self.branch_chance,
            clockwise_chance: self.clockwise_chance,
            starting_position: self.starting_ring_position,
            terrain_start_offset: self.terrain_start_z - self.spawn_z,
        }
    }

    /// Platform placement derived from these settings
    pub fn spawn_layout(&self) -> SpawnLayout {
        SpawnLayout {
            ring_radius: self.ring_radius,
            spawn_z: self.spawn_z,
            despawn_z: self.despawn_z,
            transit_secs: self.transit_secs,
        }
    }
}
