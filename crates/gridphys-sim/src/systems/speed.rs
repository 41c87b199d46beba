//! Velocity integration.
//!
//! `velocity += acceleration * dt`, then per-tick damping, speed clamps and
//! floor friction. Acceleration is a single-tick impulse and is zeroed here.

use glam::{Vec2, Vec3};
use hecs::World;

use gridphys_core::components::{Collision, Speed};

/// Integrate acceleration into velocity for all entities with Speed.
pub fn run(world: &mut World, dt: f32) {
    for (_entity, (speed, collision)) in world.query_mut::<(&mut Speed, Option<&Collision>)>() {
        speed.velocity += speed.acceleration * dt;
        apply_damping(speed);
        clamp_speed(speed);

        // Bodies with no collision component have nothing to fall off.
        let on_floor = collision.map_or(true, |c| c.is_on_floor);
        if on_floor {
            apply_friction(speed);
        }
        speed.friction = 0.0;
        speed.acceleration = Vec3::ZERO;
    }
}

fn apply_damping(speed: &mut Speed) {
    if speed.horizontal_damped {
        speed.velocity.x *= speed.damping;
        speed.velocity.z *= speed.damping;
    }
    if speed.vertical_damped {
        speed.velocity.y *= speed.damping;
    }
}

fn clamp_speed(speed: &mut Speed) {
    let max_v = speed.max_speed_vertical;
    if max_v != 0.0 {
        speed.velocity.y = speed.velocity.y.clamp(-max_v, max_v);
    }

    let max_h = speed.max_speed_horizontal;
    let horizontal = Vec2::new(speed.velocity.x, speed.velocity.z);
    if max_h != 0.0 && horizontal.length() > max_h {
        let clamped = horizontal.normalize() * max_h;
        speed.velocity.x = clamped.x;
        speed.velocity.z = clamped.y;
    }
}

fn apply_friction(speed: &mut Speed) {
    let factor = (1.0 - (speed.friction + speed.self_friction) / 2.0)
        .clamp(speed.min_friction, speed.max_friction);
    speed.velocity.x *= factor;
    speed.velocity.z *= factor;
}
