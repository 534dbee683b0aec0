//! Fixed timestep game loop
//!
//! Drives phases, pausing, speed progression and death, and delegates all
//! spawning to the track generator. Everything a tick changes is applied
//! before it returns, so no caller ever sees a half-applied speed step or
//! branch.

use super::generator::{PassReport, TrackGenerator};
use super::random::RandomPolicy;
use super::state::{GameEvent, GamePhase, GameState, PauseReason, Resume, ResumeCountdown, SpeedRamp};
use crate::highscores::BestScore;
use crate::persistence::ScoreStore;
use crate::platform::{JumpDirection, Player};
use crate::settings::Settings;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Start / confirm (menu, death screen)
    pub start: bool,
    /// Explicit pause toggle
    pub pause: bool,
    /// Focus change reported by the host: `Some(false)` lost, `Some(true)` regained
    pub focus: Option<bool>,
    /// Player jumped this tick
    pub jump: Option<JumpDirection>,
    /// Player touched down on a platform this tick
    pub landed: bool,
}

/// Loop timing and progression rules (from `Settings`)
#[derive(Debug, Clone, Copy)]
struct LoopRules {
    landings_per_speed_step: u32,
    death_height: f32,
    restart_cooldown_secs: f32,
    death_cooldown_secs: f32,
    countdown_secs: u32,
    resume_ramp_secs: f32,
}

impl LoopRules {
    fn from_settings(settings: &Settings) -> Self {
        Self {
            landings_per_speed_step: settings.landings_per_speed_step.max(1),
            death_height: settings.death_height,
            restart_cooldown_secs: settings.restart_cooldown_secs,
            death_cooldown_secs: settings.death_cooldown_secs,
            countdown_secs: settings.countdown_secs,
            resume_ramp_secs: settings.resume_ramp_secs,
        }
    }
}

/// Game loop controller
pub struct GameLoop<R: RandomPolicy, P: Player, S: ScoreStore> {
    pub state: GameState,
    generator: TrackGenerator<R>,
    player: P,
    best: BestScore<S>,
    rules: LoopRules,
}

impl<R: RandomPolicy, P: Player, S: ScoreStore> GameLoop<R, P, S> {
    /// Build the loop in the menu with a pre-filled track
    pub fn new(settings: &Settings, rng: R, player: P, store: S) -> Self {
        let settings = settings.sanitized();
        let mut generator = TrackGenerator::new(settings.track_tuning(), settings.spawn_layout(), rng);
        generator.prefill(0.0);

        Self {
            state: GameState::new(),
            generator,
            player,
            best: BestScore::new(store),
            rules: LoopRules::from_settings(&settings),
        }
    }

    /// Advance the game by one fixed timestep
    pub fn tick(&mut self, input: &TickInput, dt: f32) {
        self.state.clock.tick_real(dt);
        self.handle_focus(input.focus);

        match self.state.phase {
            GamePhase::Menu => {
                if input.start {
                    self.try_start_run();
                }
            }
            GamePhase::Dead => {
                if input.start && self.death_cooldown_elapsed() {
                    self.state.set_phase(GamePhase::Menu);
                    self.state.emit(GameEvent::MenuShown);
                }
            }
            GamePhase::Paused => {
                if input.pause && self.state.pause_reason == Some(PauseReason::Requested) {
                    self.resume_immediately();
                } else {
                    self.advance_countdown(dt);
                }
            }
            GamePhase::Running => {
                if input.pause {
                    self.pause(PauseReason::Requested);
                    return;
                }
                self.run_tick(input, dt);
            }
        }
    }

    /// Focus loss pauses (or aborts a resume); regaining it starts the countdown
    fn handle_focus(&mut self, focus: Option<bool>) {
        let Some(focused) = focus else {
            return;
        };
        if focused == self.state.focused {
            return;
        }
        self.state.focused = focused;

        if !focused {
            match self.state.phase {
                GamePhase::Running => self.pause(PauseReason::Backgrounded),
                GamePhase::Paused => {
                    // Abort any countdown in flight; the pause becomes involuntary
                    self.state.resume = Resume::Idle;
                    self.state.pause_reason = Some(PauseReason::Backgrounded);
                }
                _ => {}
            }
        } else if self.state.phase == GamePhase::Paused
            && self.state.pause_reason == Some(PauseReason::Backgrounded)
        {
            log::info!("Focus regained, counting down");
            self.state.resume = Resume::Countdown(ResumeCountdown::new(self.rules.countdown_secs));
        }
    }

    fn pause(&mut self, reason: PauseReason) {
        // Dropping a ramp mid-way is fine: the nominal speed is re-applied on resume
        self.state.resume = Resume::Idle;
        self.state.pause_reason = Some(reason);
        self.state.set_phase(GamePhase::Paused);
    }

    fn resume_immediately(&mut self) {
        self.state.pause_reason = None;
        self.state.resume = Resume::Idle;
        let speed = self.generator.current_speed();
        self.generator.set_platform_speed(speed);
        self.state.set_phase(GamePhase::Running);
    }

    fn advance_countdown(&mut self, dt: f32) {
        let Resume::Countdown(mut countdown) = self.state.resume else {
            return;
        };
        if let Some(digit) = countdown.advance(dt) {
            self.state.emit(GameEvent::Countdown(digit));
        }

        if countdown.is_done() {
            self.state.pause_reason = None;
            self.state.resume = Resume::Ramp(SpeedRamp::new(self.rules.resume_ramp_secs));
            self.generator.set_platform_speed(0.0);
            self.state.set_phase(GamePhase::Running);
        } else {
            self.state.resume = Resume::Countdown(countdown);
        }
    }

    fn can_start(&self) -> bool {
        match self.state.last_init {
            Some(at) => self.state.clock.real_time - at >= self.rules.restart_cooldown_secs,
            None => true,
        }
    }

    fn death_cooldown_elapsed(&self) -> bool {
        match self.state.died_at {
            Some(at) => self.state.clock.real_time - at >= self.rules.death_cooldown_secs,
            None => true,
        }
    }

    /// Start a run if the restart cooldown allows it
    pub fn try_start_run(&mut self) -> bool {
        if !self.can_start() {
            log::debug!("Start ignored, restart cooldown active");
            return false;
        }
        self.start_run();
        true
    }

    fn start_run(&mut self) {
        let now = self.state.clock.game_time;
        self.generator.reset(now);
        self.generator.prefill(now);
        self.player.reset_to_start();

        self.state.score = 0;
        self.state.pause_reason = None;
        self.state.resume = Resume::Idle;
        self.state.died_at = None;
        self.state.last_init = Some(self.state.clock.real_time);

        self.state.emit(GameEvent::MenuHidden);
        self.state.emit(GameEvent::ScoreChanged(0));
        self.state.emit(GameEvent::SpeedChanged(self.generator.current_speed()));
        self.state.set_phase(GamePhase::Running);
    }

    fn run_tick(&mut self, input: &TickInput, dt: f32) {
        if let Some(direction) = input.jump {
            self.state.emit(GameEvent::Jumped(direction));
        }
        if input.landed {
            self.on_landing();
        }

        // Resume ramp scales platform speed and generation time together
        let factor = match &mut self.state.resume {
            Resume::Ramp(ramp) => {
                let factor = ramp.advance(dt);
                if ramp.is_done() {
                    self.state.resume = Resume::Idle;
                }
                factor
            }
            _ => 1.0,
        };
        let speed = self.generator.current_speed() * factor;
        self.generator.set_platform_speed(speed);
        self.state.clock.tick_game(dt * factor);

        if let Some(report) = self.generator.update(self.state.clock.game_time) {
            self.publish_pass(&report);
        }
        self.generator.advance_platforms(dt);

        if self.player.vertical_position() < self.rules.death_height {
            self.die();
        }
    }

    fn on_landing(&mut self) {
        self.state.score += 1;
        self.state.emit(GameEvent::Landed);
        self.state.emit(GameEvent::ScoreChanged(self.state.score));

        if self.state.score % self.rules.landings_per_speed_step == 0 {
            let speed = self.generator.step_speed(self.state.clock.game_time);
            self.generator.cycle_color();
            self.state.emit(GameEvent::SpeedChanged(speed));
        }
    }

    fn publish_pass(&mut self, report: &PassReport) {
        if let Some((platform, position)) = report.announced {
            self.state.emit(GameEvent::PathAnnounced { platform, position });
        }
        for &slot in &report.branched {
            self.state.emit(GameEvent::LaneBranched { slot });
        }
        for &slot in &report.collapsed {
            self.state.emit(GameEvent::LaneCollapsed { slot });
        }
    }

    fn die(&mut self) {
        let score = self.state.score;
        let new_best = self.best.submit(score);
        self.player.stop();
        self.state.died_at = Some(self.state.clock.real_time);
        self.state.resume = Resume::Idle;
        self.state.set_phase(GamePhase::Dead);
        self.state.emit(GameEvent::Died {
            score,
            best: self.best.best(),
            new_best,
        });
        log::info!("Died with score {} (best {})", score, self.best.best());
    }

    /// Take all pending notifications
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.state.events)
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    pub fn best_score(&self) -> u32 {
        self.best.best()
    }

    pub fn generator(&self) -> &TrackGenerator<R> {
        &self.generator
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut P {
        &mut self.player
    }

    pub fn best(&self) -> &BestScore<S> {
        &self.best
    }
}
