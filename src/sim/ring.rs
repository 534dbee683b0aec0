//! Octagonal platform ring
//!
//! Eight discrete positions around the forward axis, listed clockwise
//! starting at the bottom. The only legal move is one step in either
//! direction, which is what keeps every next platform reachable.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::RING_SLOTS;
use crate::polar_to_cartesian;

/// One of the eight ring positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RingPosition {
    #[default]
    Bot,
    BotRight,
    Right,
    TopRight,
    Top,
    TopLeft,
    Left,
    BotLeft,
}

impl RingPosition {
    /// All positions in clockwise order
    pub const ALL: [RingPosition; RING_SLOTS] = [
        RingPosition::Bot,
        RingPosition::BotRight,
        RingPosition::Right,
        RingPosition::TopRight,
        RingPosition::Top,
        RingPosition::TopLeft,
        RingPosition::Left,
        RingPosition::BotLeft,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Position at `index` modulo the ring size
    #[inline]
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % RING_SLOTS]
    }

    /// Step one position clockwise or counterclockwise, wrapping at both ends
    pub fn advance(self, clockwise: bool) -> Self {
        let step = if clockwise { 1 } else { RING_SLOTS - 1 };
        Self::from_index(self.index() + step)
    }

    /// Number of single steps between two positions (0..=4)
    pub fn distance(self, other: RingPosition) -> usize {
        let d = (self.index() + RING_SLOTS - other.index()) % RING_SLOTS;
        d.min(RING_SLOTS - d)
    }

    /// Angle of this position around the forward axis (BOT = -90°)
    pub fn angle(self) -> f32 {
        -std::f32::consts::FRAC_PI_2 + self.index() as f32 * std::f32::consts::FRAC_PI_4
    }

    /// Lateral/vertical placement on a ring of the given radius
    pub fn placement(self, radius: f32) -> Vec2 {
        polar_to_cartesian(radius, self.angle())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RingPosition::Bot => "BOT",
            RingPosition::BotRight => "BOTRIGHT",
            RingPosition::Right => "RIGHT",
            RingPosition::TopRight => "TOPRIGHT",
            RingPosition::Top => "TOP",
            RingPosition::TopLeft => "TOPLEFT",
            RingPosition::Left => "LEFT",
            RingPosition::BotLeft => "BOTLEFT",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let upper = s.to_uppercase().replace(['_', '-', ' '], "");
        Self::ALL.into_iter().find(|p| p.as_str() == upper)
    }
}

impl std::fmt::Display for RingPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_wraps_both_ends() {
        assert_eq!(RingPosition::BotLeft.advance(true), RingPosition::Bot);
        assert_eq!(RingPosition::Bot.advance(false), RingPosition::BotLeft);
        assert_eq!(RingPosition::Bot.advance(true), RingPosition::BotRight);
        assert_eq!(RingPosition::Top.advance(false), RingPosition::TopRight);
    }

    #[test]
    fn test_full_lap_returns_home() {
        for start in RingPosition::ALL {
            let mut cw = start;
            let mut ccw = start;
            for _ in 0..RING_SLOTS {
                cw = cw.advance(true);
                ccw = ccw.advance(false);
            }
            assert_eq!(cw, start);
            assert_eq!(ccw, start);
            assert_eq!(start.advance(true).advance(false), start);
        }
    }

    #[test]
    fn test_distance() {
        assert_eq!(RingPosition::Bot.distance(RingPosition::Bot), 0);
        assert_eq!(RingPosition::Bot.distance(RingPosition::BotLeft), 1);
        assert_eq!(RingPosition::Bot.distance(RingPosition::Top), 4);
        assert_eq!(RingPosition::Right.distance(RingPosition::Left), 4);
        assert_eq!(RingPosition::TopLeft.distance(RingPosition::BotRight), 4);
        assert_eq!(RingPosition::BotRight.distance(RingPosition::TopRight), 2);
    }

    #[test]
    fn test_placement() {
        let bot = RingPosition::Bot.placement(2.0);
        assert!(bot.x.abs() < 1e-5);
        assert!((bot.y + 2.0).abs() < 1e-5);

        let right = RingPosition::Right.placement(2.0);
        assert!((right.x - 2.0).abs() < 1e-5);
        assert!(right.y.abs() < 1e-5);

        let top = RingPosition::Top.placement(2.0);
        assert!((top.y - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_names_round_trip() {
        for pos in RingPosition::ALL {
            assert_eq!(RingPosition::from_str(pos.as_str()), Some(pos));
        }
        assert_eq!(RingPosition::from_str("bot_left"), Some(RingPosition::BotLeft));
        assert_eq!(RingPosition::from_str("middle"), None);
    }
}
