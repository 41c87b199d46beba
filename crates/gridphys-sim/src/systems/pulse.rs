//! Periodic collidability toggle.
//!
//! Every `period` seconds the entity's targets flip between empty and the
//! saved mask. The timer resets to zero on each toggle.

use hecs::World;

use gridphys_core::components::{Collision, PulseCollision};

/// Advance collidability timers for all entities with PulseCollision.
pub fn run(world: &mut World, dt: f32) {
    for (_entity, (pulse, collision)) in
        world.query_mut::<(&mut PulseCollision, &mut Collision)>()
    {
        if pulse.period <= 0.0 {
            continue;
        }
        pulse.current_time += dt;
        if pulse.current_time >= pulse.period {
            pulse.current_time = 0.0;
            toggle(pulse, collision);
        }
    }
}

fn toggle(pulse: &mut PulseCollision, collision: &mut Collision) {
    match pulse.saved_targets.take() {
        Some(targets) => collision.targets = targets,
        None => {
            pulse.saved_targets = Some(collision.targets);
            collision.targets = gridphys_core::CollisionMask::NONE;
        }
    }
}
