//! Run tuning
//!
//! Every balance constant lives here so a run can be re-tuned from JSON
//! without touching the simulation. Missing fields fall back to the shipped
//! defaults.

use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading tuning
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read tuning file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Player body and launch physics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Where every run starts
    pub start_position: Vec2,
    /// Collision radius
    pub radius: f32,
    /// Launch impulse at gauge 0
    pub min_power: f32,
    /// Launch impulse at gauge 1
    pub max_power: f32,
    /// Fixed launch angle (degrees above +X)
    pub launch_angle_deg: f32,
    /// Zero velocity before a launch (relaunch after revive)
    pub reset_velocity_before_launch: bool,
    /// Never let forward speed drop below `min_forward_speed`
    pub force_forward_only: bool,
    pub min_forward_speed: f32,
    /// Passive forward damping while touching ground
    pub ground_damping: bool,
    pub ground_damping_per_sec: f32,
    /// Forward speed cap while grounded (None = unlimited)
    pub ground_max_speed: Option<f32>,
    /// Multiplier on world gravity
    pub gravity_scale: f32,
    /// Ground plane height
    pub floor_y: f32,
    /// Vertical speed kept after a floor bounce (0 = no bounce)
    pub floor_restitution: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            start_position: Vec2::new(0.0, -2.5),
            radius: crate::consts::PLAYER_RADIUS,
            min_power: 8.0,
            max_power: 18.0,
            launch_angle_deg: 35.0,
            reset_velocity_before_launch: true,
            force_forward_only: true,
            min_forward_speed: 0.5,
            ground_damping: true,
            ground_damping_per_sec: 0.08,
            ground_max_speed: None,
            gravity_scale: 1.0,
            floor_y: -3.0,
            floor_restitution: 0.3,
        }
    }
}

/// Launch power oscillator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchTuning {
    /// Ping-pong speed (full sweeps of 0..1 per second)
    pub oscillator_speed: f32,
}

impl Default for LaunchTuning {
    fn default() -> Self {
        Self {
            oscillator_speed: 1.5,
        }
    }
}

/// Risk gauge (time allowed in passthrough mode)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GaugeTuning {
    pub max_budget: f32,
    /// Seconds of budget lost per second in passthrough
    pub drain_per_sec: f32,
    /// Seconds of budget regained per second in interactive mode
    pub recover_per_sec: f32,
    /// Instant recovery on leaving passthrough, in seconds of `recover_per_sec`
    pub snap_seconds: f32,
}

impl Default for GaugeTuning {
    fn default() -> Self {
        Self {
            max_budget: 3.0,
            drain_per_sec: 1.0,
            recover_per_sec: 0.5,
            snap_seconds: 1.0,
        }
    }
}

/// Level chunk generation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkTuning {
    pub chunk_length: f32,
    /// X of the first chunk (one chunk behind the start to avoid a gap)
    pub start_spawn_x: f32,
    pub origin_y: f32,
    pub initial_chunks: usize,
    pub keep_behind: usize,
    /// Spawn once the player is this close to `next_spawn_x`
    pub spawn_ahead_offset: f32,
    /// Below this distance chunks come from the onboarding list in order
    pub onboarding_distance: f32,
    /// From this distance chunks come from the hard pool
    pub hard_tier_distance: f32,
}

impl Default for ChunkTuning {
    fn default() -> Self {
        Self {
            chunk_length: 25.0,
            start_spawn_x: -25.0,
            origin_y: -3.0,
            initial_chunks: 7,
            keep_behind: 3,
            spawn_ahead_offset: 45.0,
            onboarding_distance: 100.0,
            hard_tier_distance: 250.0,
        }
    }
}

/// Moving hazards in the hard tier
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HazardTuning {
    pub start_distance: f32,
    /// Distance between consecutive hazards
    pub spacing: f32,
    /// Spawn this far ahead of the player
    pub ahead_x: f32,
    pub min_y: f32,
    pub max_y: f32,
    /// Leftward speed (units/s)
    pub move_speed: f32,
    /// Despawn once this far behind the player
    pub despawn_margin: f32,
}

impl Default for HazardTuning {
    fn default() -> Self {
        Self {
            start_distance: 250.0,
            spacing: 35.0,
            ahead_x: 35.0,
            min_y: -2.0,
            max_y: 6.0,
            move_speed: 8.0,
            despawn_margin: 30.0,
        }
    }
}

/// One-shot revive
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviveTuning {
    pub allow_revive_once: bool,
    /// Invincibility after the post-revive relaunch (real-time seconds)
    pub invincible_seconds: f32,
}

impl Default for ReviveTuning {
    fn default() -> Self {
        Self {
            allow_revive_once: true,
            invincible_seconds: 2.0,
        }
    }
}

/// Complete run tuning
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub player: PlayerTuning,
    pub launch: LaunchTuning,
    pub gauge: GaugeTuning,
    pub chunks: ChunkTuning,
    pub hazards: HazardTuning,
    pub revive: ReviveTuning,
}

impl Tuning {
    /// Parse and validate tuning from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
            ConfigError::Invalid {
                field,
                reason: reason.into(),
            }
        }

        let p = &self.player;
        if p.min_power > p.max_power {
            return Err(invalid("player.min_power", "must not exceed max_power"));
        }
        if p.radius <= 0.0 {
            return Err(invalid("player.radius", "must be positive"));
        }
        if self.launch.oscillator_speed < 0.0 {
            return Err(invalid("launch.oscillator_speed", "must not be negative"));
        }

        let g = &self.gauge;
        if g.max_budget <= 0.0 {
            return Err(invalid("gauge.max_budget", "must be positive"));
        }
        if g.drain_per_sec < 0.0 || g.recover_per_sec < 0.0 || g.snap_seconds < 0.0 {
            return Err(invalid("gauge", "rates must not be negative"));
        }

        if self.chunks.chunk_length <= 0.0 {
            return Err(invalid("chunks.chunk_length", "must be positive"));
        }

        let h = &self.hazards;
        if h.spacing <= 0.0 {
            return Err(invalid("hazards.spacing", "must be positive"));
        }
        if h.min_y > h.max_y {
            return Err(invalid("hazards.min_y", "must not exceed max_y"));
        }
        if self.revive.invincible_seconds < 0.0 {
            return Err(invalid("revive.invincible_seconds", "must not be negative"));
        }
        Ok(())
    }
}
