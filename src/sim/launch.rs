//! Launch power oscillator
//!
//! Sweeps 0 -> 1 -> 0 while the run is Ready; the value at the launch tap
//! picks the launch power.

use serde::{Deserialize, Serialize};

/// Source of the launch power snapshot
pub trait PowerSampler {
    /// Current value in [0, 1]
    fn sample01(&self) -> f32;
    /// Advance on the presentation tick
    fn update(&mut self, _dt: f32) {}
    fn set_running(&mut self, _running: bool) {}
    fn set_visible(&mut self, _visible: bool) {}
}

/// Ping-pong launch gauge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchGauge {
    value: f32,
    /// +1 rising, -1 falling
    dir: f32,
    speed: f32,
    running: bool,
    visible: bool,
}

impl LaunchGauge {
    pub fn new(speed: f32) -> Self {
        Self {
            value: 0.0,
            dir: 1.0,
            speed,
            running: true,
            visible: true,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn reset(&mut self) {
        self.value = 0.0;
        self.dir = 1.0;
    }
}

impl PowerSampler for LaunchGauge {
    fn sample01(&self) -> f32 {
        self.value
    }

    fn update(&mut self, dt: f32) {
        if !self.running {
            return;
        }
        self.value += self.dir * self.speed * dt;
        if self.value >= 1.0 {
            self.value = 1.0;
            self.dir = -1.0;
        } else if self.value <= 0.0 {
            self.value = 0.0;
            self.dir = 1.0;
        }
    }

    fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ping_pong() {
        let mut g = LaunchGauge::new(1.5);
        g.update(0.5);
        assert!((g.sample01() - 0.75).abs() < 1e-6);
        g.update(0.5);
        assert_eq!(g.sample01(), 1.0);
        g.update(0.2);
        assert!((g.sample01() - 0.7).abs() < 1e-5);
        g.update(10.0);
        assert_eq!(g.sample01(), 0.0);
    }

    #[test]
    fn test_stopped_gauge_holds_value() {
        let mut g = LaunchGauge::new(1.0);
        g.update(0.3);
        g.set_running(false);
        g.update(0.3);
        assert!((g.sample01() - 0.3).abs() < 1e-6);
        g.reset();
        assert_eq!(g.sample01(), 0.0);
    }
}
