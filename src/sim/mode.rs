//! Player interaction mode
//!
//! Interactive: objects and hazards touch the player, risk gauge recovers.
//! Passthrough: the player ghosts through everything, risk gauge drains.
//! Invulnerable: revive-only; ghosts through everything with the gauge paused.

use serde::{Deserialize, Serialize};

use super::world::Capabilities;

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlayerMode {
    /// Safe mode
    #[default]
    Interactive,
    /// Unsafe mode
    Passthrough,
    Invulnerable,
}

impl PlayerMode {
    /// Both interactable objects and traps collide only in Interactive
    pub fn interaction_enabled(self) -> bool {
        self == PlayerMode::Interactive
    }
}

/// A real mode transition, delivered to subscribers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeChange {
    pub new: PlayerMode,
    pub prev: PlayerMode,
}

/// Listeners for mode changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModeSubscriber {
    RiskGauge,
    /// Event outbox (tint, trail, gauge colour)
    Presentation,
}

/// Holds the mode and its subscriber registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionModeController {
    mode: PlayerMode,
    /// Delivery order is registration order
    subscribers: Vec<ModeSubscriber>,
}

impl Default for InteractionModeController {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionModeController {
    pub fn new() -> Self {
        Self {
            mode: PlayerMode::Interactive,
            subscribers: Vec::new(),
        }
    }

    pub fn mode(&self) -> PlayerMode {
        self.mode
    }

    /// Register a subscriber. Returns false if it was already registered.
    pub fn subscribe(&mut self, subscriber: ModeSubscriber) -> bool {
        if self.subscribers.contains(&subscriber) {
            return false;
        }
        self.subscribers.push(subscriber);
        true
    }

    /// Remove a subscriber. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, subscriber: ModeSubscriber) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| *s != subscriber);
        self.subscribers.len() != before
    }

    pub fn subscribers(&self) -> &[ModeSubscriber] {
        &self.subscribers
    }

    /// Flip Interactive <-> Passthrough. Invulnerable cannot be toggled.
    pub fn toggle(&mut self) -> Option<ModeChange> {
        match self.mode {
            PlayerMode::Interactive => self.set_mode(PlayerMode::Passthrough),
            PlayerMode::Passthrough => self.set_mode(PlayerMode::Interactive),
            PlayerMode::Invulnerable => None,
        }
    }

    /// Change mode; no-op (and no notification) if already in `mode`
    pub fn set_mode(&mut self, mode: PlayerMode) -> Option<ModeChange> {
        if mode == self.mode {
            return None;
        }
        let change = ModeChange {
            new: mode,
            prev: self.mode,
        };
        self.mode = mode;
        log::debug!("[Mode] {:?} -> {:?}", change.prev, change.new);
        Some(change)
    }

    /// Whether a contact with an entity should be resolved
    pub fn allows_contact(&self, caps: Capabilities) -> bool {
        caps.interactable && self.mode.interaction_enabled()
    }
}
