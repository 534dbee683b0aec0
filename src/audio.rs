//! Audio cues
//!
//! The core never plays sound itself. Game events map to cues, and the host
//! plugs in a sink that does the actual playback.

use crate::sim::{GameEvent, GamePhase};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Player jumped
    Jump,
    /// Player touched down on a platform
    Land,
    /// Speed step
    SpeedUp,
    /// Countdown digit
    CountdownTick,
    /// Run started
    Start,
    /// Player fell
    Death,
    /// New best score
    HighScore,
}

/// Cue for an event, if any
pub fn sound_for(event: &GameEvent) -> Option<SoundEffect> {
    match event {
        GameEvent::Jumped(_) => Some(SoundEffect::Jump),
        GameEvent::Landed => Some(SoundEffect::Land),
        GameEvent::SpeedChanged(_) => Some(SoundEffect::SpeedUp),
        GameEvent::Countdown(_) => Some(SoundEffect::CountdownTick),
        GameEvent::PhaseChanged {
            from: GamePhase::Menu,
            to: GamePhase::Running,
        } => Some(SoundEffect::Start),
        GameEvent::Died { new_best: true, .. } => Some(SoundEffect::HighScore),
        GameEvent::Died { .. } => Some(SoundEffect::Death),
        _ => None,
    }
}

/// Fire-and-forget playback
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect, volume: f32);
}

/// Discards every cue
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _effect: SoundEffect, _volume: f32) {}
}

/// Logs cues at debug level
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAudio;

impl AudioSink for LogAudio {
    fn play(&mut self, effect: SoundEffect, volume: f32) {
        log::debug!("sfx {:?} @ {:.2}", effect, volume);
    }
}

/// Audio manager for the game
pub struct AudioManager<S: AudioSink> {
    sink: S,
    volume: f32,
    muted: bool,
}

impl<S: AudioSink> AudioManager<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            volume: 0.8,
            muted: false,
        }
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.volume
        }
    }

    /// Play the cue for `event`, if it has one
    pub fn handle(&mut self, event: &GameEvent) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        if let Some(effect) = sound_for(event) {
            self.sink.play(effect, vol);
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder(Vec<SoundEffect>);

    impl AudioSink for Recorder {
        fn play(&mut self, effect: SoundEffect, _volume: f32) {
            self.0.push(effect);
        }
    }

    #[test]
    fn test_event_mapping() {
        assert_eq!(sound_for(&GameEvent::Landed), Some(SoundEffect::Land));
        assert_eq!(
            sound_for(&GameEvent::Died { score: 3, best: 3, new_best: true }),
            Some(SoundEffect::HighScore)
        );
        assert_eq!(
            sound_for(&GameEvent::Died { score: 1, best: 3, new_best: false }),
            Some(SoundEffect::Death)
        );
        assert_eq!(sound_for(&GameEvent::MenuShown), None);
    }

    #[test]
    fn test_muted_plays_nothing() {
        let mut audio = AudioManager::new(Recorder::default());
        audio.handle(&GameEvent::Landed);
        audio.set_muted(true);
        audio.handle(&GameEvent::Landed);
        assert_eq!(audio.sink().0, vec![SoundEffect::Land]);
    }
}
