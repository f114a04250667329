//! `Entity`: the scene-graph node, spec.md §3. The only kind with a
//! self-referential dependency (`parent`), so its create/update path is the
//! one that must run the acyclic-parent check (invariant 4).
use noodles_core::id::{EntityTag, GeometryTag, Id, LightTag, PlotTag, TableTag};

use crate::search::{AttachedMethods, AttachedSignals};

pub type Transform = [f64; 16];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceSource {
    pub view: noodles_core::id::Id<noodles_core::id::BufferViewTag>,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderRep {
    pub geometry: Id<GeometryTag>,
    pub instances: Option<InstanceSource>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntityRepresentation {
    Null,
    Text(String),
    Web(String),
    Render(RenderRep),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub parent: Option<Id<EntityTag>>,
    pub transform: Transform,
    pub representation: EntityRepresentation,
    pub lights: Vec<Id<LightTag>>,
    pub tables: Vec<Id<TableTag>>,
    pub plots: Vec<Id<PlotTag>>,
    pub tags: Vec<String>,
    pub methods: AttachedMethods,
    pub signals: AttachedSignals,
    pub influence_aabb: Option<Aabb>,
}

pub const IDENTITY_TRANSFORM: Transform = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

impl Default for Entity {
    fn default() -> Self {
        Self {
            parent: None,
            transform: IDENTITY_TRANSFORM,
            representation: EntityRepresentation::Null,
            lights: Vec::new(),
            tables: Vec::new(),
            plots: Vec::new(),
            tags: Vec::new(),
            methods: AttachedMethods::new(),
            signals: AttachedSignals::new(),
            influence_aabb: None,
        }
    }
}
