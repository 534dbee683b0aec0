//! Random policy used by track generation
//!
//! Generation only ever needs three kinds of draws: a weighted coin flip and
//! bounded float/int samples. Keeping them behind a trait lets tests swap in a
//! scripted source and force branches or directions.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Source of nondeterminism for the generator
pub trait RandomPolicy {
    /// True with `probability_percent` percent chance (clamped to 0..=100)
    fn coin_flip(&mut self, probability_percent: u32) -> bool;

    /// Uniform sample in `[min, max]`
    fn uniform_float(&mut self, min: f32, max: f32) -> f32;

    /// Uniform sample in `[min, max]`
    fn uniform_int(&mut self, min: i32, max: i32) -> i32;
}

/// Seeded PCG source (reproducible runs)
#[derive(Debug, Clone)]
pub struct SeededRandom {
    seed: u64,
    rng: Pcg32,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Rewind to the start of the seed's stream
    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = Pcg32::seed_from_u64(seed);
    }
}

impl RandomPolicy for SeededRandom {
    fn coin_flip(&mut self, probability_percent: u32) -> bool {
        let p = probability_percent.min(100);
        self.rng.random_range(0..100) < p
    }

    fn uniform_float(&mut self, min: f32, max: f32) -> f32 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        if lo == hi {
            return lo;
        }
        self.rng.random_range(lo..=hi)
    }

    fn uniform_int(&mut self, min: i32, max: i32) -> i32 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        self.rng.random_range(lo..=hi)
    }
}

/// Scripted source for tests and replays
///
/// Coin flips are served from a queue, falling back to `default_coin` once
/// it runs dry. Float draws return the midpoint of the range (or a fixed
/// value when set) and int draws return the lower bound.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    coins: VecDeque<bool>,
    default_coin: bool,
    fixed_float: Option<f32>,
}

impl ScriptedRandom {
    /// Every coin flip returns `value`
    pub fn always(value: bool) -> Self {
        Self {
            default_coin: value,
            ..Default::default()
        }
    }

    /// Serve `coins` in order, then `default_coin`
    pub fn with_coins(coins: impl IntoIterator<Item = bool>, default_coin: bool) -> Self {
        Self {
            coins: coins.into_iter().collect(),
            default_coin,
            fixed_float: None,
        }
    }

    /// Pin every float draw to `value`
    pub fn with_fixed_float(mut self, value: f32) -> Self {
        self.fixed_float = Some(value);
        self
    }

    /// Coin flips still queued
    pub fn remaining(&self) -> usize {
        self.coins.len()
    }
}

impl RandomPolicy for ScriptedRandom {
    fn coin_flip(&mut self, _probability_percent: u32) -> bool {
        self.coins.pop_front().unwrap_or(self.default_coin)
    }

    fn uniform_float(&mut self, min: f32, max: f32) -> f32 {
        self.fixed_float.unwrap_or((min + max) * 0.5)
    }

    fn uniform_int(&mut self, min: i32, max: i32) -> i32 {
        min.min(max)
    }
}
