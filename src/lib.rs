//! Glide Run - A one-tap auto-scrolling flight game
//!
//! Core modules:
//! - `sim`: Deterministic run simulation (state machine, spawners, gauge)
//! - `settings`: Data-driven tuning loaded from JSON
//! - `catalog`: Level-segment and hazard templates
//! - `stats`: Distance tracking and best-distance record
//! - `persistence`: Best-distance storage

pub mod catalog;
pub mod persistence;
pub mod settings;
pub mod sim;
pub mod stats;

pub use catalog::TemplateCatalog;
pub use settings::{ConfigError, Tuning};
pub use stats::RunStats;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz for smooth physics)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// World gravity (units/s², before the body's gravity scale)
    pub const GRAVITY: f32 = -9.81;

    /// Player collision radius
    pub const PLAYER_RADIUS: f32 = 0.5;

    /// Chunks kept past `keep_behind` before the oldest is recycled
    pub const CHUNK_BUFFER: usize = 4;
}

/// Linear interpolation, `t` clamped to [0, 1]
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// Unit direction for an angle in degrees (0° = +X, counter-clockwise)
#[inline]
pub fn direction_from_degrees(angle_deg: f32) -> Vec2 {
    let rad = angle_deg.to_radians();
    Vec2::new(rad.cos(), rad.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_clamps() {
        assert_eq!(lerp(8.0, 18.0, 0.0), 8.0);
        assert_eq!(lerp(8.0, 18.0, 1.0), 18.0);
        assert_eq!(lerp(8.0, 18.0, 0.5), 13.0);
        assert_eq!(lerp(8.0, 18.0, 2.0), 18.0);
        assert_eq!(lerp(8.0, 18.0, -1.0), 8.0);
    }

    #[test]
    fn test_direction_from_degrees() {
        let d = direction_from_degrees(0.0);
        assert!((d.x - 1.0).abs() < 1e-6 && d.y.abs() < 1e-6);
        let d = direction_from_degrees(90.0);
        assert!(d.x.abs() < 1e-6 && (d.y - 1.0).abs() < 1e-6);
        assert!((direction_from_degrees(35.0).length() - 1.0).abs() < 1e-6);
    }
}
