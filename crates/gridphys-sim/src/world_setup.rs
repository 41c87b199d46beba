//! Entity spawn factories and canned maps for setting up a world.

use glam::Vec3;
use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use gridphys_core::components::*;
use gridphys_core::{Bounds, CollisionMask};

use crate::components::ColliderHistory;

/// A falling, colliding box: collides with the grid and with other bodies.
pub fn spawn_body(world: &mut World, position: Vec3, half_extents: Vec3) -> Entity {
    world.spawn((
        Transform {
            position,
            scale: 1.0,
        },
        bounds_at(position, half_extents),
        Speed::default(),
        Movement::default(),
        Collision::default(),
        GridCollider::default(),
        Gravity::default(),
    ))
}

/// An immovable solid box. Other bodies are pushed out of it.
pub fn spawn_static_block(world: &mut World, center: Vec3, half_extents: Vec3) -> Entity {
    world.spawn((
        Transform {
            position: center,
            scale: 1.0,
        },
        bounds_at(center, half_extents),
        Collision::default(),
    ))
}

/// A trigger volume that reports each body entering it once per `clear_time`.
pub fn spawn_sensor(
    world: &mut World,
    center: Vec3,
    half_extents: Vec3,
    targets: CollisionMask,
    clear_time: f32,
) -> Entity {
    world.spawn((
        Transform {
            position: center,
            scale: 1.0,
        },
        bounds_at(center, half_extents),
        Collision {
            is_sensor: true,
            groups: CollisionMask::TRIGGER,
            targets,
            ..Default::default()
        },
        ColliderHistory::new(clear_time),
    ))
}

/// Spawn `count` unit-sized bodies at random positions inside `region`,
/// with a small random horizontal velocity.
pub fn scatter_bodies(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    count: usize,
    region: &Bounds,
) -> Vec<Entity> {
    let (min, max) = (region.min(), region.max());
    (0..count)
        .map(|_| {
            let position = Vec3::new(
                rng.gen_range(min.x..=max.x),
                rng.gen_range(min.y..=max.y),
                rng.gen_range(min.z..=max.z),
            );
            let entity = spawn_body(world, position, Vec3::splat(0.5));
            if let Ok(mut speed) = world.get::<&mut Speed>(entity) {
                speed.velocity.x = rng.gen_range(-2.0..=2.0);
                speed.velocity.z = rng.gen_range(-2.0..=2.0);
            }
            entity
        })
        .collect()
}

/// Flat x-major tile volume: type 1 below `floor_height`, empty above.
pub fn flat_floor_tiles(dims: [usize; 3], floor_height: usize) -> Vec<u8> {
    let [dx, dy, dz] = dims;
    let mut tiles = Vec::with_capacity(dx * dy * dz);
    for _x in 0..dx {
        for y in 0..dy {
            let tile = u8::from(y < floor_height);
            tiles.extend(std::iter::repeat(tile).take(dz));
        }
    }
    tiles
}

fn bounds_at(center: Vec3, half_extents: Vec3) -> Aabb {
    Aabb {
        center,
        local_extent: half_extents,
        world_extent: half_extents,
        ..Default::default()
    }
}
