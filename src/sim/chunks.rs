//! Level chunk generation
//!
//! Chunks are laid end to end along +X. A new one is spawned whenever the
//! player gets within `spawn_ahead_offset` of the next slot; the oldest are
//! recycled once more than `keep_behind + CHUNK_BUFFER` exist.
//!
//! Template tiers by run distance:
//! 1. below `onboarding_distance`: the onboarding list in order, holding on
//!    the last entry
//! 2. from `hard_tier_distance`: random hard template
//! 3. otherwise: random easy template
//! 4. fallback: random onboarding template, or nothing

use std::collections::VecDeque;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::events::RunEvent;
use super::world::{Capabilities, EntityId, EntityKind, World};
use crate::catalog::{TemplateCatalog, TemplateRef, Tier};
use crate::consts::CHUNK_BUFFER;
use crate::settings::ChunkTuning;

/// Stream salt so chunk and hazard RNGs differ for the same run seed
const RNG_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// A placed chunk
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkRecord {
    pub id: EntityId,
    pub x: f32,
    pub template: TemplateRef,
}

#[derive(Debug, Clone)]
pub struct ChunkGenerator {
    tuning: ChunkTuning,
    next_spawn_x: f32,
    run_origin_x: f32,
    /// Oldest first
    spawned: VecDeque<ChunkRecord>,
    /// Chunks spawned since the last reset (drives the onboarding walk)
    spawned_this_run: usize,
    rng: Pcg32,
    warned_empty: bool,
}

impl ChunkGenerator {
    /// Create an empty generator; call [`reset`](Self::reset) to lay the
    /// initial chunks.
    pub fn new(tuning: &ChunkTuning, seed: u64) -> Self {
        Self {
            tuning: tuning.clone(),
            next_spawn_x: tuning.start_spawn_x,
            run_origin_x: 0.0,
            spawned: VecDeque::new(),
            spawned_this_run: 0,
            rng: Pcg32::seed_from_u64(seed ^ RNG_SALT),
            warned_empty: false,
        }
    }

    pub fn next_spawn_x(&self) -> f32 {
        self.next_spawn_x
    }

    pub fn run_origin_x(&self) -> f32 {
        self.run_origin_x
    }

    /// Live chunks, oldest first
    pub fn chunks(&self) -> impl Iterator<Item = &ChunkRecord> {
        self.spawned.iter()
    }

    pub fn len(&self) -> usize {
        self.spawned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spawned.is_empty()
    }

    /// Spawn one chunk if the player is close enough, then recycle old ones
    pub fn tick(
        &mut self,
        world: &mut World,
        catalog: &TemplateCatalog,
        player_x: f32,
        events: &mut Vec<RunEvent>,
    ) -> Option<EntityId> {
        if player_x + self.tuning.spawn_ahead_offset < self.next_spawn_x {
            return None;
        }
        let spawned = self.spawn_next(world, catalog, player_x, events);
        self.prune(world, events);
        spawned
    }

    /// Destroy every chunk and lay the initial ones again from `player_x`
    pub fn reset(
        &mut self,
        world: &mut World,
        catalog: &TemplateCatalog,
        player_x: f32,
        events: &mut Vec<RunEvent>,
    ) {
        while let Some(old) = self.spawned.pop_front() {
            world.queue_destroy(old.id);
        }
        self.next_spawn_x = self.tuning.start_spawn_x;
        self.run_origin_x = player_x;
        self.spawned_this_run = 0;

        for _ in 0..self.tuning.initial_chunks {
            self.spawn_next(world, catalog, player_x, events);
        }
        log::info!(
            "[Chunks] Reset: {} chunks, next spawn at {}",
            self.spawned.len(),
            self.next_spawn_x
        );
    }

    /// Pick the template for the next chunk
    pub fn pick_template(&mut self, catalog: &TemplateCatalog, player_x: f32) -> Option<TemplateRef> {
        let distance = player_x - self.run_origin_x;

        let pick = |tier: Tier, index: usize| Some(TemplateRef { tier, index });

        if distance < self.tuning.onboarding_distance && !catalog.onboarding.is_empty() {
            let index = self.spawned_this_run.min(catalog.onboarding.len() - 1);
            return pick(Tier::Onboarding, index);
        }
        if distance >= self.tuning.hard_tier_distance && !catalog.hard.is_empty() {
            let index = self.rng.random_range(0..catalog.hard.len());
            return pick(Tier::Hard, index);
        }
        if !catalog.easy.is_empty() {
            let index = self.rng.random_range(0..catalog.easy.len());
            return pick(Tier::Easy, index);
        }
        if !catalog.onboarding.is_empty() {
            let index = self.rng.random_range(0..catalog.onboarding.len());
            return pick(Tier::Onboarding, index);
        }
        None
    }

    fn spawn_next(
        &mut self,
        world: &mut World,
        catalog: &TemplateCatalog,
        player_x: f32,
        events: &mut Vec<RunEvent>,
    ) -> Option<EntityId> {
        let Some(template_ref) = self.pick_template(catalog, player_x) else {
            if !self.warned_empty {
                log::warn!("[Chunks] All chunk catalogs are empty; no level will be generated");
                self.warned_empty = true;
            }
            return None;
        };
        let template = catalog.get(template_ref)?;

        let origin = Vec2::new(self.next_spawn_x, self.tuning.origin_y);
        let id = world.spawn(
            EntityKind::Chunk {
                template: template_ref,
            },
            None,
            origin,
            Vec2::new(self.tuning.chunk_length * 0.5, 0.0),
            Capabilities::default(),
        );
        for placement in &template.objects {
            world.spawn(
                EntityKind::Object {
                    kind: placement.kind,
                },
                Some(id),
                origin + placement.offset,
                placement.half_extents,
                Capabilities {
                    interactable: true,
                    is_hazard: placement.kind.is_hazard(),
                },
            );
        }

        self.spawned.push_back(ChunkRecord {
            id,
            x: self.next_spawn_x,
            template: template_ref,
        });
        self.spawned_this_run += 1;
        log::debug!(
            "[Chunks] Spawned {:?}#{} '{}' at x={}",
            template_ref.tier,
            template_ref.index,
            template.name,
            self.next_spawn_x
        );
        events.push(RunEvent::ChunkSpawned {
            id,
            x: self.next_spawn_x,
            template: template_ref,
        });

        self.next_spawn_x += self.tuning.chunk_length;
        Some(id)
    }

    fn prune(&mut self, world: &mut World, events: &mut Vec<RunEvent>) {
        let max_keep = self.tuning.keep_behind + CHUNK_BUFFER;
        while self.spawned.len() > max_keep {
            if let Some(old) = self.spawned.pop_front() {
                world.queue_destroy(old.id);
                events.push(RunEvent::ChunkRecycled { id: old.id });
            }
        }
    }
}
