//! Risk gauge
//!
//! Time budget for passthrough mode. Drains while passthrough, recovers while
//! interactive, frozen while paused (invulnerable). Hitting zero ends the run.
//!
//! Leaving passthrough grants an instant "snap" recovery of
//! `recover_per_sec * snap_seconds`, once per passthrough excursion.

use serde::{Deserialize, Serialize};

use super::mode::{ModeChange, PlayerMode};
use super::state::RunState;
use crate::settings::GaugeTuning;

/// Outcome of a gauge tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaugeTick {
    Idle,
    Draining,
    Recovering,
    /// Budget hit zero this tick
    Exhausted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskGauge {
    tuning: GaugeTuning,
    time_left: f32,
    /// Snap bonus already used since the last interactive -> passthrough switch
    snap_applied: bool,
    paused: bool,
}

impl RiskGauge {
    pub fn new(tuning: &GaugeTuning) -> Self {
        Self {
            tuning: tuning.clone(),
            time_left: tuning.max_budget,
            snap_applied: false,
            paused: false,
        }
    }

    pub fn time_left(&self) -> f32 {
        self.time_left
    }

    pub fn max_budget(&self) -> f32 {
        self.tuning.max_budget
    }

    /// Fill fraction for the HUD bar
    pub fn normalized01(&self) -> f32 {
        (self.time_left / self.tuning.max_budget).clamp(0.0, 1.0)
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Refill to max and re-arm the snap bonus
    pub fn reset(&mut self) {
        self.time_left = self.tuning.max_budget;
        self.snap_applied = false;
        log::debug!("[Gauge] Reset to max: {}", self.tuning.max_budget);
    }

    /// Advance the gauge. Only runs while flying and not paused.
    pub fn tick(&mut self, dt: f32, run_state: RunState, mode: PlayerMode) -> GaugeTick {
        if run_state != RunState::Flying || self.paused {
            return GaugeTick::Idle;
        }

        match mode {
            PlayerMode::Passthrough => {
                self.time_left -= self.tuning.drain_per_sec * dt;
                if self.time_left <= 0.0 {
                    self.time_left = 0.0;
                    log::info!("[Gauge] Budget exhausted");
                    return GaugeTick::Exhausted;
                }
                GaugeTick::Draining
            }
            PlayerMode::Interactive => {
                self.time_left =
                    (self.time_left + self.tuning.recover_per_sec * dt).min(self.tuning.max_budget);
                GaugeTick::Recovering
            }
            PlayerMode::Invulnerable => GaugeTick::Idle,
        }
    }

    /// Mode-change subscriber. Returns the snap bonus if one was applied.
    pub fn on_mode_changed(&mut self, change: ModeChange) -> Option<f32> {
        match (change.prev, change.new) {
            (PlayerMode::Passthrough, PlayerMode::Interactive) if !self.snap_applied => {
                let bonus = self.tuning.recover_per_sec * self.tuning.snap_seconds;
                self.time_left = (self.time_left + bonus).min(self.tuning.max_budget);
                self.snap_applied = true;
                log::debug!("[Gauge] Snap recovery +{:.2}, total {:.2}", bonus, self.time_left);
                Some(bonus)
            }
            (PlayerMode::Interactive, PlayerMode::Passthrough) => {
                self.snap_applied = false;
                None
            }
            _ => None,
        }
    }
}
