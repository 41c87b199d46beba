//! Seam for an external rigid-body solver.
//!
//! The pipeline steps the backend once per tick, after movement has been
//! requested and before the grid and bounds colliders clamp it. No real
//! solver ships with this crate; `NullRigidBody` only keeps the static
//! object registry so callers can exercise the API.

use std::collections::BTreeMap;

use glam::Vec3;
use hecs::{Entity, World};
use tracing::debug;

/// Triangle soup registered as immovable geometry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticMesh {
    pub vertices: Vec<Vec3>,
    pub triangles: Vec<[u32; 3]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StaticObjectId(pub u64);

pub trait RigidBodyBackend {
    /// Advance the solver. Returns the entities it considers grounded this tick.
    fn step(&mut self, world: &mut World, dt: f32) -> Vec<Entity>;

    fn add_static_object(&mut self, mesh: StaticMesh) -> StaticObjectId;

    /// Returns false if `id` was not registered.
    fn remove_static_object(&mut self, id: StaticObjectId) -> bool;
}

#[derive(Debug, Default)]
pub struct NullRigidBody {
    statics: BTreeMap<StaticObjectId, StaticMesh>,
    next_id: u64,
}

impl NullRigidBody {
    pub fn static_object_count(&self) -> usize {
        self.statics.len()
    }
}

impl RigidBodyBackend for NullRigidBody {
    fn step(&mut self, _world: &mut World, _dt: f32) -> Vec<Entity> {
        Vec::new()
    }

    fn add_static_object(&mut self, mesh: StaticMesh) -> StaticObjectId {
        let id = StaticObjectId(self.next_id);
        self.next_id += 1;
        debug!(id = id.0, triangles = mesh.triangles.len(), "static object added");
        self.statics.insert(id, mesh);
        id
    }

    fn remove_static_object(&mut self, id: StaticObjectId) -> bool {
        self.statics.remove(&id).is_some()
    }
}
