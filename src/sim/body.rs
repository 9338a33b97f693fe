//! Player body physics
//!
//! Unit-mass point body integrated with semi-implicit Euler. Ground contact
//! is only used for passive forward damping; it never ends a run.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::GRAVITY;
use crate::settings::PlayerTuning;
use crate::{direction_from_degrees, lerp};

/// Vertical speed below which a floor bounce settles
const BOUNCE_SETTLE_SPEED: f32 = 0.5;
/// Height above the floor that still counts as touching
const GROUND_EPSILON: f32 = 0.01;

/// The player's physics body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerBody {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Physics simulation enabled
    simulated: bool,
    /// Open ground contacts (floor + host-reported)
    ground_contacts: u32,
    /// Floor currently counted in `ground_contacts`
    on_floor: bool,
    tuning: PlayerTuning,
}

impl PlayerBody {
    pub fn new(tuning: &PlayerTuning) -> Self {
        Self {
            pos: tuning.start_position,
            vel: Vec2::ZERO,
            radius: tuning.radius,
            simulated: false,
            ground_contacts: 0,
            on_floor: false,
            tuning: tuning.clone(),
        }
    }

    pub fn is_simulated(&self) -> bool {
        self.simulated
    }

    pub fn is_grounded(&self) -> bool {
        self.ground_contacts > 0
    }

    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    /// Add an impulse (ignored while physics is off)
    pub fn apply_impulse(&mut self, impulse: Vec2) {
        if !self.simulated {
            return;
        }
        self.vel += impulse;
    }

    pub fn set_velocity(&mut self, vel: Vec2) {
        self.vel = vel;
    }

    pub fn set_position(&mut self, pos: Vec2) {
        self.pos = pos;
    }

    /// Toggle physics; disabling also stops the body
    pub fn set_simulation_enabled(&mut self, enabled: bool) {
        self.simulated = enabled;
        if !enabled {
            self.vel = Vec2::ZERO;
        }
    }

    /// Stop in place with physics off
    pub fn freeze(&mut self) {
        self.simulated = false;
        self.vel = Vec2::ZERO;
    }

    /// Teleport to the run start with physics on and no velocity
    pub fn reset_run(&mut self, start: Vec2) {
        self.simulated = true;
        self.pos = start;
        self.vel = Vec2::ZERO;
        self.ground_contacts = 0;
        self.on_floor = false;
    }

    /// Launch with power `lerp(min, max, v01) * multiplier` at the fixed angle.
    /// Returns the applied power.
    pub fn launch_by_gauge(&mut self, v01: f32, multiplier: f32) -> f32 {
        let v01 = v01.clamp(0.0, 1.0);
        if self.tuning.reset_velocity_before_launch {
            self.vel = Vec2::ZERO;
        }
        let power = lerp(self.tuning.min_power, self.tuning.max_power, v01) * multiplier;
        self.apply_impulse(direction_from_degrees(self.tuning.launch_angle_deg) * power);
        power
    }

    pub fn multiply_velocity(&mut self, x_mul: f32, y_mul: f32) {
        self.vel.x *= x_mul;
        self.vel.y *= y_mul;
    }

    /// Point the velocity at `angle_deg`, keeping at least `min_speed` and
    /// adding `extra_speed`. Direction is always rightward.
    pub fn reorient_velocity(&mut self, angle_deg: f32, min_speed: f32, extra_speed: f32) {
        let target_speed = self.speed().max(min_speed) + extra_speed;
        let mut dir = direction_from_degrees(angle_deg);
        dir.x = dir.x.abs();
        self.vel = dir * target_speed;
    }

    pub fn begin_ground_contact(&mut self) {
        self.ground_contacts += 1;
    }

    pub fn end_ground_contact(&mut self) {
        self.ground_contacts = self.ground_contacts.saturating_sub(1);
    }

    /// Advance one fixed step
    pub fn integrate(&mut self, dt: f32) {
        if !self.simulated {
            return;
        }

        self.vel.y += GRAVITY * self.tuning.gravity_scale * dt;
        self.pos += self.vel * dt;

        // Floor
        let floor = self.tuning.floor_y + self.radius;
        if self.pos.y <= floor {
            self.pos.y = floor;
            if self.vel.y < 0.0 {
                self.vel.y = -self.vel.y * self.tuning.floor_restitution;
                if self.vel.y < BOUNCE_SETTLE_SPEED {
                    self.vel.y = 0.0;
                }
            }
            if !self.on_floor {
                self.on_floor = true;
                self.begin_ground_contact();
            }
        } else if self.on_floor && self.pos.y > floor + GROUND_EPSILON {
            self.on_floor = false;
            self.end_ground_contact();
        }

        if self.tuning.force_forward_only && self.vel.x < self.tuning.min_forward_speed {
            self.vel.x = self.tuning.min_forward_speed;
        }

        if self.tuning.ground_damping && self.is_grounded() {
            let mul = (1.0 - self.tuning.ground_damping_per_sec * dt).clamp(0.0, 1.0);
            self.vel.x *= mul;
            if let Some(max) = self.tuning.ground_max_speed {
                self.vel.x = self.vel.x.min(max);
            }
        }
    }
}
