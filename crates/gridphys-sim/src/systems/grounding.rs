//! Per-source grounded bookkeeping.
//!
//! Each collision source raises its own flag in `GroundState`; aggregation
//! ORs them into `Collision::is_on_floor`. The aggregated flag survives
//! cleanup so the next tick's speed pass can read it.

use glam::Vec3;
use hecs::{Entity, World};
use tracing::debug;

use gridphys_core::components::{Collision, GroundState, Movement};

/// Attach `GroundState` to collision entities seen for the first time.
pub fn attach_ground_state(world: &mut World) {
    let added: Vec<Entity> = world
        .query::<(&Collision, Option<&GroundState>)>()
        .iter()
        .filter(|(_, (_, ground))| ground.is_none())
        .map(|(entity, _)| entity)
        .collect();

    for entity in added {
        if let Err(e) = world.insert_one(entity, GroundState::default()) {
            debug!(?entity, error = %e, "could not attach ground state");
        }
    }
}

/// Copy the requested displacement aside before any collider clamps it.
pub fn snapshot_pre_physics(world: &mut World) {
    for (_entity, (movement, collision)) in world.query_mut::<(&Movement, &mut Collision)>() {
        collision.pre_physics_move = movement.displacement;
    }
}

pub fn mark_rigid_body(world: &mut World, grounded: &[Entity]) {
    for &entity in grounded {
        if let Ok(mut ground) = world.get::<&mut GroundState>(entity) {
            ground.rigid_body = true;
        }
    }
}

pub fn aggregate(world: &mut World) {
    for (_entity, (collision, ground)) in world.query_mut::<(&mut Collision, &GroundState)>() {
        collision.is_on_floor = ground.grid || ground.bounds || ground.rigid_body;
    }
}

/// End-of-tick reset: per-source flags and the consumed displacement.
pub fn cleanup(world: &mut World) {
    for (_entity, ground) in world.query_mut::<&mut GroundState>() {
        *ground = GroundState::default();
    }
    for (_entity, movement) in world.query_mut::<&mut Movement>() {
        movement.displacement = Vec3::ZERO;
    }
}
