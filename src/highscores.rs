//! Best score tracking
//!
//! Loaded once from the store, compared after every run and written back only
//! when beaten. Store failures never reach gameplay: they are logged and the
//! best simply isn't updated this session.

use crate::persistence::ScoreStore;

/// Best score backed by a store
#[derive(Debug)]
pub struct BestScore<S: ScoreStore> {
    store: S,
    best: u32,
    /// Set when a save failed; cleared by the next successful save
    degraded: bool,
}

impl<S: ScoreStore> BestScore<S> {
    pub fn new(mut store: S) -> Self {
        let best = match store.load_best() {
            Ok(Some(best)) => {
                log::info!("Loaded best score {}", best);
                best
            }
            Ok(None) => {
                log::info!("No best score found, starting fresh");
                0
            }
            Err(e) => {
                log::warn!("Failed to load best score: {}", e);
                0
            }
        };

        Self {
            store,
            best,
            degraded: false,
        }
    }

    /// Check if a score beats the stored best
    pub fn qualifies(&self, score: u32) -> bool {
        score > self.best
    }

    /// Record a finished run. Returns true if it set a new best.
    pub fn submit(&mut self, score: u32) -> bool {
        if !self.qualifies(score) {
            return false;
        }

        match self.store.save_best(score) {
            Ok(()) => {
                log::info!("New best score {} (was {})", score, self.best);
                self.best = score;
                self.degraded = false;
                true
            }
            Err(e) => {
                log::warn!("Best score not saved: {}", e);
                self.degraded = true;
                false
            }
        }
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}
