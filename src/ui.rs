//! HUD model
//!
//! Folds game events into the text a front end would display. Purely
//! observational: nothing here feeds back into the simulation.

use crate::sim::{GameEvent, GamePhase};

/// Death screen stats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeathStats {
    pub score: u32,
    pub best: u32,
    pub new_best: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hud {
    pub score: u32,
    pub speed: f32,
    pub menu_visible: bool,
    /// Countdown digit currently shown
    pub countdown: Option<u32>,
    pub death: Option<DeathStats>,
    pub paused: bool,
}

impl Default for Hud {
    fn default() -> Self {
        Self {
            score: 0,
            speed: 0.0,
            menu_visible: true,
            countdown: None,
            death: None,
            paused: false,
        }
    }
}

impl Hud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: &GameEvent) {
        match *event {
            GameEvent::ScoreChanged(score) => self.score = score,
            GameEvent::SpeedChanged(speed) => self.speed = speed,
            GameEvent::MenuShown => {
                self.menu_visible = true;
                self.death = None;
            }
            GameEvent::MenuHidden => self.menu_visible = false,
            GameEvent::Countdown(digit) => self.countdown = Some(digit),
            GameEvent::Died {
                score,
                best,
                new_best,
            } => {
                self.death = Some(DeathStats {
                    score,
                    best,
                    new_best,
                })
            }
            GameEvent::PhaseChanged { to, .. } => {
                self.paused = to == GamePhase::Paused;
                if to != GamePhase::Paused {
                    self.countdown = None;
                }
            }
            _ => {}
        }
    }

    /// Text for the countdown overlay
    pub fn countdown_text(&self) -> Option<String> {
        self.countdown.map(|d| d.to_string())
    }

    pub fn score_text(&self) -> String {
        format!("{}", self.score)
    }

    pub fn death_text(&self) -> Option<String> {
        self.death.map(|d| {
            if d.new_best {
                format!("Score {} - new best!", d.score)
            } else {
                format!("Score {} (best {})", d.score, d.best)
            }
        })
    }
}
