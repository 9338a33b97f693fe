//! Run events and the presentation seam
//!
//! The simulation never renders or plays audio. It records what happened in
//! an outbox that the host drains once per frame; sound cues are
//! fire-and-forget.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::mode::PlayerMode;
use super::state::RunState;
use super::world::EntityId;
use crate::catalog::{ObjectKind, TemplateRef};

/// Fire-and-forget audio cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundCue {
    Launch,
    ModeSwitch,
    ObjectHit,
    Invincible,
    GameOver,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    /// Touched a trap or moving hazard
    Hazard,
    /// Risk gauge ran out
    GaugeExhausted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RunEvent {
    StateChanged { new: RunState, prev: RunState },
    Launched { power: f32 },
    /// Mode change, for tint, trail and gauge colour
    ModeChanged { new: PlayerMode, prev: PlayerMode },
    SnapBonus { amount: f32 },
    ChunkSpawned { id: EntityId, x: f32, template: TemplateRef },
    ChunkRecycled { id: EntityId },
    HazardSpawned { id: EntityId, pos: Vec2 },
    HazardDespawned { id: EntityId },
    ObjectTriggered { id: EntityId, kind: ObjectKind },
    InvincibilityStarted,
    InvincibilityEnded,
    GameOver { cause: DeathCause, can_revive: bool, distance: f32 },
    Revived,
    Sound(SoundCue),
}

/// UI collaborator for the game-over panel
pub trait Presenter {
    fn show_game_over_panel(&mut self, can_revive: bool, distance: f32, best: f32);
    fn hide_panel(&mut self);
}
