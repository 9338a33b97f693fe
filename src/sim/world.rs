//! Entity arena for spawned level content
//!
//! Chunks, their trigger objects and moving hazards live here, addressed by
//! stable ids. Destruction is deferred: ids are queued during the tick and
//! removed in one `flush` at the end of it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::catalog::{ObjectKind, TemplateRef};

pub type EntityId = u32;

/// Per-entity contact rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Capabilities {
    /// Collides with the player in interactive mode
    pub interactable: bool,
    /// Contact ends the run
    pub is_hazard: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    /// Level segment root
    Chunk { template: TemplateRef },
    /// Trigger object owned by a chunk
    Object { kind: ObjectKind },
    /// Leftward-moving hazard
    Hazard,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    /// Owning entity, destroyed together with it
    pub parent: Option<EntityId>,
    pub pos: Vec2,
    pub vel: Vec2,
    pub half_extents: Vec2,
    pub caps: Capabilities,
    /// Player overlapped this entity last tick
    pub touching: bool,
}

impl Entity {
    /// Circle vs axis-aligned box overlap
    pub fn overlaps_circle(&self, center: Vec2, radius: f32) -> bool {
        let closest = center.clamp(self.pos - self.half_extents, self.pos + self.half_extents);
        closest.distance_squared(center) <= radius * radius
    }
}

/// All live entities, sorted by id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    entities: Vec<Entity>,
    destroy_queue: Vec<EntityId>,
    next_id: EntityId,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            destroy_queue: Vec::new(),
            next_id: 1,
        }
    }

    pub fn spawn(
        &mut self,
        kind: EntityKind,
        parent: Option<EntityId>,
        pos: Vec2,
        half_extents: Vec2,
        caps: Capabilities,
    ) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        self.entities.push(Entity {
            id,
            kind,
            parent,
            pos,
            vel: Vec2::ZERO,
            half_extents,
            caps,
            touching: false,
        });
        id
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities
            .binary_search_by_key(&id, |e| e.id)
            .ok()
            .map(|i| &self.entities[i])
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities
            .binary_search_by_key(&id, |e| e.id)
            .ok()
            .map(|i| &mut self.entities[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Mark for removal at the next flush. Children go with their parent.
    pub fn queue_destroy(&mut self, id: EntityId) {
        if !self.destroy_queue.contains(&id) {
            self.destroy_queue.push(id);
        }
    }

    pub fn is_pending_destroy(&self, id: EntityId) -> bool {
        self.destroy_queue.contains(&id)
            || self
                .get(id)
                .and_then(|e| e.parent)
                .is_some_and(|p| self.destroy_queue.contains(&p))
    }

    /// Remove everything queued. Returns the number of entities removed.
    pub fn flush(&mut self) -> usize {
        if self.destroy_queue.is_empty() {
            return 0;
        }
        let queue = std::mem::take(&mut self.destroy_queue);
        let before = self.entities.len();
        self.entities.retain(|e| {
            !queue.contains(&e.id) && !e.parent.is_some_and(|p| queue.contains(&p))
        });
        before - self.entities.len()
    }

    /// Queue every entity matching `pred`
    pub fn queue_destroy_where(&mut self, pred: impl Fn(&Entity) -> bool) {
        let ids: Vec<EntityId> = self.entities.iter().filter(|e| pred(e)).map(|e| e.id).collect();
        for id in ids {
            self.queue_destroy(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Tier;

    fn chunk_kind() -> EntityKind {
        EntityKind::Chunk {
            template: TemplateRef {
                tier: Tier::Easy,
                index: 0,
            },
        }
    }

    #[test]
    fn test_ids_are_stable_and_increasing() {
        let mut world = World::new();
        let a = world.spawn(chunk_kind(), None, Vec2::ZERO, Vec2::ONE, Capabilities::default());
        let b = world.spawn(EntityKind::Hazard, None, Vec2::X, Vec2::ONE, Capabilities::default());
        assert!(b > a);
        world.queue_destroy(a);
        world.flush();
        assert!(world.get(a).is_none());
        assert_eq!(world.get(b).unwrap().pos, Vec2::X);
    }

    #[test]
    fn test_destroy_is_deferred_and_cascades() {
        let mut world = World::new();
        let chunk = world.spawn(chunk_kind(), None, Vec2::ZERO, Vec2::ONE, Capabilities::default());
        let child = world.spawn(
            EntityKind::Object {
                kind: ObjectKind::Trap,
            },
            Some(chunk),
            Vec2::new(3.0, 0.0),
            Vec2::splat(0.5),
            Capabilities {
                interactable: true,
                is_hazard: true,
            },
        );
        world.queue_destroy(chunk);
        world.queue_destroy(chunk);
        assert_eq!(world.len(), 2);
        assert!(world.is_pending_destroy(child));
        assert_eq!(world.flush(), 2);
        assert!(world.is_empty());
        assert_eq!(world.flush(), 0);
    }

    #[test]
    fn test_circle_box_overlap() {
        let mut world = World::new();
        let id = world.spawn(
            EntityKind::Hazard,
            None,
            Vec2::new(10.0, 0.0),
            Vec2::splat(0.5),
            Capabilities::default(),
        );
        let e = world.get(id).unwrap();
        assert!(e.overlaps_circle(Vec2::new(9.2, 0.0), 0.5));
        assert!(!e.overlaps_circle(Vec2::new(8.0, 0.0), 0.5));
        assert!(e.overlaps_circle(Vec2::new(10.0, 0.0), 0.1));
    }
}
