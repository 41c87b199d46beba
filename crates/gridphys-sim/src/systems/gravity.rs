//! Upstream force source: adds each entity's gravity to its Speed acceleration.
//! Runs before the pipeline because Speed consumes acceleration every tick.

use hecs::World;

use gridphys_core::components::{Gravity, Speed};

/// Add gravity to acceleration for all entities with Gravity + Speed.
pub fn run(world: &mut World) {
    for (_entity, (gravity, speed)) in world.query_mut::<(&Gravity, &mut Speed)>() {
        speed.acceleration += gravity.acceleration;
    }
}
