//! Moving hazards
//!
//! Past `start_distance` a hazard is spawned every `spacing` units of run
//! distance, `ahead_x` in front of the player at a random height. Hazards
//! drift left at a fixed speed and despawn once `despawn_margin` behind.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::events::RunEvent;
use super::world::{Capabilities, EntityId, EntityKind, World};
use crate::catalog::HazardTemplate;
use crate::settings::HazardTuning;

const RNG_SALT: u64 = 0xD1B5_4A32_D192_ED03;

#[derive(Debug, Clone)]
pub struct HazardSpawner {
    tuning: HazardTuning,
    run_origin_x: f32,
    next_spawn_at_distance: f32,
    rng: Pcg32,
    warned_spacing: bool,
}

impl HazardSpawner {
    pub fn new(tuning: &HazardTuning, seed: u64) -> Self {
        Self {
            tuning: tuning.clone(),
            run_origin_x: 0.0,
            next_spawn_at_distance: tuning.start_distance,
            rng: Pcg32::seed_from_u64(seed ^ RNG_SALT),
            warned_spacing: false,
        }
    }

    pub fn run_origin_x(&self) -> f32 {
        self.run_origin_x
    }

    pub fn next_spawn_at_distance(&self) -> f32 {
        self.next_spawn_at_distance
    }

    /// Restart distance counting from the player's position
    pub fn reset_run(&mut self, player_x: f32) {
        self.run_origin_x = player_x;
        self.next_spawn_at_distance = self.tuning.start_distance;
    }

    /// Spawn every hazard whose distance mark has been passed. Returns the
    /// number spawned.
    pub fn tick(
        &mut self,
        world: &mut World,
        template: Option<&HazardTemplate>,
        player_pos: Vec2,
        events: &mut Vec<RunEvent>,
    ) -> usize {
        let Some(template) = template else {
            return 0;
        };
        // Zero spacing would never advance the spawn mark
        if self.tuning.spacing.is_nan() || self.tuning.spacing <= 0.0 {
            if !self.warned_spacing {
                log::warn!(
                    "[Hazards] Spacing {} is not positive, spawning disabled",
                    self.tuning.spacing
                );
                self.warned_spacing = true;
            }
            return 0;
        }

        let distance = (player_pos.x - self.run_origin_x).max(0.0);
        if distance < self.tuning.start_distance {
            return 0;
        }

        let mut count = 0;
        while distance >= self.next_spawn_at_distance {
            self.spawn_one(world, template, player_pos, events);
            self.next_spawn_at_distance += self.tuning.spacing;
            count += 1;
        }
        count
    }

    fn spawn_one(
        &mut self,
        world: &mut World,
        template: &HazardTemplate,
        player_pos: Vec2,
        events: &mut Vec<RunEvent>,
    ) -> EntityId {
        let (lo, hi) = if self.tuning.min_y <= self.tuning.max_y {
            (self.tuning.min_y, self.tuning.max_y)
        } else {
            (self.tuning.max_y, self.tuning.min_y)
        };
        let y = if lo < hi {
            self.rng.random_range(lo..=hi)
        } else {
            lo
        };
        let pos = Vec2::new(player_pos.x + self.tuning.ahead_x, y);
        let id = world.spawn(
            EntityKind::Hazard,
            None,
            pos,
            template.half_extents,
            Capabilities {
                interactable: true,
                is_hazard: true,
            },
        );
        if let Some(hazard) = world.get_mut(id) {
            hazard.vel = Vec2::new(-self.tuning.move_speed, 0.0);
        }
        log::debug!("[Hazards] Spawned #{} at ({:.1}, {:.1})", id, pos.x, pos.y);
        events.push(RunEvent::HazardSpawned { id, pos });
        id
    }

    /// Move hazards and despawn the ones left behind
    pub fn update_hazards(
        &self,
        world: &mut World,
        player_x: f32,
        dt: f32,
        events: &mut Vec<RunEvent>,
    ) {
        let despawn_x = player_x - self.tuning.despawn_margin;
        let mut behind = Vec::new();
        for hazard in world
            .iter_mut()
            .filter(|e| matches!(e.kind, EntityKind::Hazard))
        {
            hazard.pos += hazard.vel * dt;
            if hazard.pos.x < despawn_x {
                behind.push(hazard.id);
            }
        }
        for id in behind {
            if !world.is_pending_destroy(id) {
                world.queue_destroy(id);
                events.push(RunEvent::HazardDespawned { id });
            }
        }
    }

    /// Remove every live hazard
    pub fn clear(&self, world: &mut World) {
        world.queue_destroy_where(|e| matches!(e.kind, EntityKind::Hazard));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hazard_count(world: &World) -> usize {
        world
            .iter()
            .filter(|e| matches!(e.kind, EntityKind::Hazard))
            .count()
    }

    fn setup() -> (HazardSpawner, World, Vec<RunEvent>) {
        let mut spawner = HazardSpawner::new(&HazardTuning::default(), 11);
        spawner.reset_run(0.0);
        (spawner, World::new(), Vec::new())
    }

    #[test]
    fn test_nothing_before_start_distance() {
        let (mut spawner, mut world, mut events) = setup();
        let template = HazardTemplate::default();
        for x in (0..250).step_by(5) {
            spawner.tick(&mut world, Some(&template), Vec2::new(x as f32, 0.0), &mut events);
        }
        assert_eq!(hazard_count(&world), 0);
    }

    #[test]
    fn test_spawn_count_matches_spacing() {
        let template = HazardTemplate::default();
        for final_distance in [250.0f32, 284.0, 285.0, 400.0, 1000.0] {
            let (mut spawner, mut world, mut events) = setup();
            let mut x = 0.0;
            while x < final_distance {
                x = (x + 3.7).min(final_distance);
                spawner.tick(&mut world, Some(&template), Vec2::new(x, 0.0), &mut events);
            }
            let expected = ((final_distance - 250.0) / 35.0).floor() as usize + 1;
            assert_eq!(hazard_count(&world), expected, "final distance {}", final_distance);
        }
    }

    #[test]
    fn test_single_jump_spawns_all_due() {
        let (mut spawner, mut world, mut events) = setup();
        let n = spawner.tick(
            &mut world,
            Some(&HazardTemplate::default()),
            Vec2::new(360.0, 0.0),
            &mut events,
        );
        assert_eq!(n, 4);
        assert_eq!(spawner.next_spawn_at_distance(), 390.0);
    }

    #[test]
    fn test_spawn_placement() {
        let (mut spawner, mut world, mut events) = setup();
        spawner.tick(
            &mut world,
            Some(&HazardTemplate::default()),
            Vec2::new(250.0, 0.0),
            &mut events,
        );
        let hazard = world.iter().next().unwrap();
        assert_eq!(hazard.pos.x, 285.0);
        assert!((-2.0..=6.0).contains(&hazard.pos.y));
        assert_eq!(hazard.vel, Vec2::new(-8.0, 0.0));
        assert!(hazard.caps.is_hazard && hazard.caps.interactable);
    }

    #[test]
    fn test_missing_template_skips() {
        let (mut spawner, mut world, mut events) = setup();
        assert_eq!(spawner.tick(&mut world, None, Vec2::new(900.0, 0.0), &mut events), 0);
        assert_eq!(spawner.next_spawn_at_distance(), 250.0);
    }

    #[test]
    fn test_moves_left_and_despawns() {
        let (mut spawner, mut world, mut events) = setup();
        spawner.tick(
            &mut world,
            Some(&HazardTemplate::default()),
            Vec2::new(250.0, 0.0),
            &mut events,
        );
        spawner.update_hazards(&mut world, 250.0, 1.0, &mut events);
        assert_eq!(world.iter().next().unwrap().pos.x, 277.0);

        // Player far ahead: hazard is now > 30 behind
        spawner.update_hazards(&mut world, 320.0, 0.1, &mut events);
        assert!(events.iter().any(|e| matches!(e, RunEvent::HazardDespawned { .. })));
        world.flush();
        assert_eq!(hazard_count(&world), 0);
    }

    #[test]
    fn test_bad_spacing_spawns_nothing() {
        let tuning = HazardTuning {
            spacing: 0.0,
            ..Default::default()
        };
        let mut spawner = HazardSpawner::new(&tuning, 11);
        spawner.reset_run(0.0);
        let (mut world, mut events) = (World::new(), Vec::new());
        let n = spawner.tick(
            &mut world,
            Some(&HazardTemplate::default()),
            Vec2::new(400.0, 0.0),
            &mut events,
        );
        assert_eq!(n, 0);
        assert!(world.is_empty());
    }

    #[test]
    fn test_inverted_y_range_is_swapped() {
        let tuning = HazardTuning {
            min_y: 6.0,
            max_y: -2.0,
            ..Default::default()
        };
        let mut spawner = HazardSpawner::new(&tuning, 11);
        spawner.reset_run(0.0);
        let (mut world, mut events) = (World::new(), Vec::new());
        let n = spawner.tick(
            &mut world,
            Some(&HazardTemplate::default()),
            Vec2::new(400.0, 0.0),
            &mut events,
        );
        assert_eq!(n, 5);
        assert!(world.iter().all(|h| (-2.0..=6.0).contains(&h.pos.y)));
    }

    #[test]
    fn test_reset_run() {
        let (mut spawner, mut world, mut events) = setup();
        spawner.tick(
            &mut world,
            Some(&HazardTemplate::default()),
            Vec2::new(400.0, 0.0),
            &mut events,
        );
        spawner.reset_run(400.0);
        assert_eq!(spawner.next_spawn_at_distance(), 250.0);
        assert_eq!(spawner.run_origin_x(), 400.0);
        spawner.clear(&mut world);
        world.flush();
        assert_eq!(hazard_count(&world), 0);
    }
}
