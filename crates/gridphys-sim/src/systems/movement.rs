//! Turns velocity into the tick's requested displacement.
//!
//! Never touches transforms; the colliders may clamp the request in place
//! and the spatial collaborator applies whatever is left.

use hecs::World;

use gridphys_core::components::{Movement, Speed};

/// Turn velocity into requested displacement for all entities with Speed + Movement.
pub fn run(world: &mut World, dt: f32) {
    for (_entity, (movement, speed)) in world.query_mut::<(&mut Movement, &Speed)>() {
        movement.displacement = speed.velocity * dt;
    }
}
