//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only (one stream per spawner)
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or platform dependencies

pub mod body;
pub mod chunks;
pub mod events;
pub mod gauge;
pub mod hazards;
pub mod launch;
pub mod mode;
pub mod state;
pub mod tick;
pub mod timer;
pub mod world;

pub use body::PlayerBody;
pub use chunks::{ChunkGenerator, ChunkRecord};
pub use events::{DeathCause, Presenter, RunEvent, SoundCue};
pub use gauge::{GaugeTick, RiskGauge};
pub use hazards::HazardSpawner;
pub use launch::{LaunchGauge, PowerSampler};
pub use mode::{InteractionModeController, ModeChange, ModeSubscriber, PlayerMode};
pub use state::{ReviveFlags, Run, RunState};
pub use tick::{TickInput, frame, tick};
pub use timer::Timer;
pub use world::{Capabilities, Entity, EntityId, EntityKind, World};
