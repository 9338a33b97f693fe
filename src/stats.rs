//! Distance tracking
//!
//! Recomputes the run distance from the player position every tick and keeps
//! the best distance, persisted through a [`BestDistanceStore`].

use std::fmt;

use crate::persistence::BestDistanceStore;

/// Current/best distance for the active run
pub struct RunStats {
    run_start_x: f32,
    current: f32,
    best: f32,
    /// Best improved since the last commit
    unsaved: bool,
    store: Option<Box<dyn BestDistanceStore>>,
}

impl fmt::Debug for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunStats")
            .field("run_start_x", &self.run_start_x)
            .field("current", &self.current)
            .field("best", &self.best)
            .field("unsaved", &self.unsaved)
            .field("has_store", &self.store.is_some())
            .finish()
    }
}

impl Default for RunStats {
    fn default() -> Self {
        Self::new()
    }
}

impl RunStats {
    /// Tracker without persistence
    pub fn new() -> Self {
        Self {
            run_start_x: 0.0,
            current: 0.0,
            best: 0.0,
            unsaved: false,
            store: None,
        }
    }

    /// Tracker seeded from (and saving to) a store
    pub fn with_store(store: Box<dyn BestDistanceStore>) -> Self {
        let best = match store.load() {
            Ok(Some(best)) => {
                log::info!("Loaded best distance {:.1}", best);
                best
            }
            Ok(None) => 0.0,
            Err(e) => {
                log::warn!("Could not load best distance, starting fresh: {}", e);
                0.0
            }
        };
        Self {
            best: best.max(0.0),
            store: Some(store),
            ..Self::new()
        }
    }

    /// Reset the distance origin to the player's position
    pub fn begin_run(&mut self, player_x: f32) {
        self.run_start_x = player_x;
        self.current = 0.0;
    }

    /// Recompute distance for this tick
    pub fn update(&mut self, player_x: f32) {
        self.current = (player_x - self.run_start_x).max(0.0);
        if self.current > self.best {
            self.best = self.current;
            self.unsaved = true;
        }
    }

    pub fn current_distance(&self) -> f32 {
        self.current
    }

    pub fn best_distance(&self) -> f32 {
        self.best
    }

    /// Persist the best distance if it improved. Failures are logged only.
    pub fn commit(&mut self) {
        if !self.unsaved {
            return;
        }
        let Some(store) = self.store.as_mut() else {
            self.unsaved = false;
            return;
        };
        match store.save(self.best) {
            Ok(()) => {
                self.unsaved = false;
                log::info!("Best distance saved ({:.1})", self.best);
            }
            Err(e) => log::warn!("Failed to save best distance: {}", e),
        }
    }
}
