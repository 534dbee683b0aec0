//! Game-loop state and events
//!
//! Multi-tick effects (resume countdown, speed ramp) are plain state objects
//! advanced once per tick; aborting one means dropping it.

use serde::{Deserialize, Serialize};

use super::ring::RingPosition;
use super::spawner::PlatformHandle;
use crate::platform::JumpDirection;

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for start input
    Menu,
    /// Active gameplay
    Running,
    /// Frozen (explicit toggle or focus loss)
    Paused,
    /// Run ended, waiting for the death cooldown
    Dead,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Menu => "Menu",
            GamePhase::Running => "Running",
            GamePhase::Paused => "Paused",
            GamePhase::Dead => "Dead",
        }
    }
}

/// Why the game is paused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PauseReason {
    /// Pause toggle; the same toggle resumes immediately
    Requested,
    /// Focus lost; regaining focus resumes through a countdown and speed ramp
    Backgrounded,
}

/// Notifications for UI/audio/environment collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PhaseChanged { from: GamePhase, to: GamePhase },
    /// New platform on the primary lane
    PathAnnounced { platform: PlatformHandle, position: RingPosition },
    LaneBranched { slot: usize },
    LaneCollapsed { slot: usize },
    Jumped(JumpDirection),
    Landed,
    ScoreChanged(u32),
    SpeedChanged(f32),
    /// Resume countdown digit (3, 2, 1)
    Countdown(u32),
    Died { score: u32, best: u32, new_best: bool },
    MenuShown,
    MenuHidden,
}

/// Pausable game time plus unpaused real time
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GameClock {
    /// Advances only while running, scaled by the resume ramp
    pub game_time: f32,
    /// Always advances
    pub real_time: f32,
}

impl GameClock {
    pub fn tick_real(&mut self, dt: f32) {
        self.real_time += dt;
    }

    pub fn tick_game(&mut self, dt: f32) {
        self.game_time += dt;
    }
}

/// 3-2-1 countdown in real time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResumeCountdown {
    pub remaining: f32,
    /// Digit last shown, 0 before the first
    pub shown: u32,
}

impl ResumeCountdown {
    pub fn new(seconds: u32) -> Self {
        Self {
            remaining: seconds as f32,
            shown: 0,
        }
    }

    /// Digit that should be on screen now
    pub fn digit(&self) -> u32 {
        self.remaining.max(0.0).ceil() as u32
    }

    pub fn is_done(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Advance by `dt`; returns a digit the first time it becomes visible
    pub fn advance(&mut self, dt: f32) -> Option<u32> {
        if self.shown == 0 {
            self.shown = self.digit();
            return (self.shown > 0).then_some(self.shown);
        }
        self.remaining -= dt;
        let digit = self.digit();
        if digit > 0 && digit != self.shown {
            self.shown = digit;
            return Some(digit);
        }
        None
    }
}

/// Linear 0 → 1 speed factor over real time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedRamp {
    pub elapsed: f32,
    pub duration: f32,
}

impl SpeedRamp {
    pub fn new(duration: f32) -> Self {
        Self {
            elapsed: 0.0,
            duration,
        }
    }

    pub fn factor(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    /// Advance and return the factor to apply this tick
    pub fn advance(&mut self, dt: f32) -> f32 {
        self.elapsed += dt;
        self.factor()
    }

    pub fn is_done(&self) -> bool {
        self.factor() >= 1.0
    }
}

/// In-flight resume effect
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum Resume {
    #[default]
    Idle,
    /// Paused, counting down after focus came back
    Countdown(ResumeCountdown),
    /// Running, ramping platform speed back up
    Ramp(SpeedRamp),
}

/// Mutable game-loop state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub phase: GamePhase,
    pub clock: GameClock,
    /// Landings this run
    pub score: u32,
    pub pause_reason: Option<PauseReason>,
    pub resume: Resume,
    /// Real time of the last run start
    pub last_init: Option<f32>,
    /// Real time of the last death
    pub died_at: Option<f32>,
    /// Whether the host window has focus
    pub focused: bool,
    /// Pending notifications (drained by the host)
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    pub fn new() -> Self {
        Self {
            phase: GamePhase::Menu,
            clock: GameClock::default(),
            score: 0,
            pause_reason: None,
            resume: Resume::Idle,
            last_init: None,
            died_at: None,
            focused: true,
            events: Vec::new(),
        }
    }

    /// Switch phase, recording the transition
    pub fn set_phase(&mut self, to: GamePhase) {
        let from = self.phase;
        if from == to {
            return;
        }
        log::info!("Phase {} -> {}", from.as_str(), to.as_str());
        self.phase = to;
        self.events.push(GameEvent::PhaseChanged { from, to });
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}
