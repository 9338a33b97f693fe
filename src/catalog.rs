//! Level-segment and hazard templates
//!
//! Catalogs are static configuration: the generator only reads them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Which catalog list a chunk was drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    /// Fixed sequence shown at the start of every run
    Onboarding,
    Easy,
    Hard,
}

/// Stable identity of a chunk template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TemplateRef {
    pub tier: Tier,
    pub index: usize,
}

/// Trigger object behaviour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ObjectKind {
    /// Extra impulse on contact
    BoostPad { impulse: Vec2 },
    /// Scales the player's velocity per axis
    SlowZone { x_mul: f32, y_mul: f32 },
    /// Redirects the player to a fixed angle
    UpperHit {
        angle_deg: f32,
        min_speed: f32,
        extra_speed: f32,
    },
    /// Ends the run
    Trap,
}

impl ObjectKind {
    /// Whether contact with this object ends the run
    pub fn is_hazard(&self) -> bool {
        matches!(self, ObjectKind::Trap)
    }
}

/// An object placed relative to its chunk origin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Placement {
    pub kind: ObjectKind,
    pub offset: Vec2,
    pub half_extents: Vec2,
}

/// A level segment template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkTemplate {
    pub name: String,
    #[serde(default)]
    pub objects: Vec<Placement>,
}

impl ChunkTemplate {
    pub fn new(name: impl Into<String>, objects: Vec<Placement>) -> Self {
        Self {
            name: name.into(),
            objects,
        }
    }
}

/// The moving hazard spawned in the hard tier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HazardTemplate {
    pub half_extents: Vec2,
}

impl Default for HazardTemplate {
    fn default() -> Self {
        Self {
            half_extents: Vec2::splat(0.5),
        }
    }
}

/// All templates for a run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateCatalog {
    pub onboarding: Vec<ChunkTemplate>,
    pub easy: Vec<ChunkTemplate>,
    pub hard: Vec<ChunkTemplate>,
    pub hazard: Option<HazardTemplate>,
}

impl TemplateCatalog {
    /// Look up a template by reference
    pub fn get(&self, template: TemplateRef) -> Option<&ChunkTemplate> {
        self.list(template.tier).get(template.index)
    }

    pub fn list(&self, tier: Tier) -> &[ChunkTemplate] {
        match tier {
            Tier::Onboarding => &self.onboarding,
            Tier::Easy => &self.easy,
            Tier::Hard => &self.hard,
        }
    }

    /// True when no chunk can ever be generated
    pub fn is_empty(&self) -> bool {
        self.onboarding.is_empty() && self.easy.is_empty() && self.hard.is_empty()
    }

    /// Parse a catalog from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The catalog the game ships with
    pub fn builtin() -> Self {
        let boost = |x: f32, y: f32| Placement {
            kind: ObjectKind::BoostPad {
                impulse: Vec2::new(6.0, 0.0),
            },
            offset: Vec2::new(x, y),
            half_extents: Vec2::new(1.0, 0.25),
        };
        let slow = |x: f32, y: f32| Placement {
            kind: ObjectKind::SlowZone {
                x_mul: 0.6,
                y_mul: 1.0,
            },
            offset: Vec2::new(x, y),
            half_extents: Vec2::new(1.5, 1.5),
        };
        let upper = |x: f32, y: f32| Placement {
            kind: ObjectKind::UpperHit {
                angle_deg: 35.0,
                min_speed: 8.0,
                extra_speed: 0.0,
            },
            offset: Vec2::new(x, y),
            half_extents: Vec2::new(0.75, 0.25),
        };
        let trap = |x: f32, y: f32| Placement {
            kind: ObjectKind::Trap,
            offset: Vec2::new(x, y),
            half_extents: Vec2::new(0.5, 0.5),
        };

        Self {
            onboarding: vec![
                ChunkTemplate::new("flat", vec![]),
                ChunkTemplate::new("first_boost", vec![boost(12.0, 0.5)]),
                ChunkTemplate::new("first_upper", vec![upper(10.0, 0.5)]),
                ChunkTemplate::new("first_trap", vec![boost(6.0, 0.5), trap(16.0, 0.5)]),
            ],
            easy: vec![
                ChunkTemplate::new("boost_pair", vec![boost(5.0, 0.5), boost(18.0, 0.5)]),
                ChunkTemplate::new("slow_then_upper", vec![slow(8.0, 2.0), upper(16.0, 0.5)]),
                ChunkTemplate::new("trap_gap", vec![trap(12.0, 0.5), upper(20.0, 0.5)]),
            ],
            hard: vec![
                ChunkTemplate::new(
                    "trap_field",
                    vec![trap(6.0, 0.5), trap(12.0, 3.0), trap(18.0, 0.5)],
                ),
                ChunkTemplate::new(
                    "slow_trap",
                    vec![slow(6.0, 2.0), trap(14.0, 1.5), boost(20.0, 0.5)],
                ),
            ],
            hazard: Some(HazardTemplate::default()),
        }
    }
}
