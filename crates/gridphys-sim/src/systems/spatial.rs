//! Minimal spatial collaborator: keeps `Aabb` in step with `Transform` and
//! applies the resolved displacement. The pipeline never calls these; the
//! engine runs them around each physics tick.

use hecs::World;

use gridphys_core::components::{Aabb, Movement, Transform};

/// Recompute world offset, extent and center from the transform.
/// Bounds without a transform keep their center.
pub fn sync_bounds(world: &mut World) {
    for (_entity, (aabb, transform)) in world.query_mut::<(&mut Aabb, Option<&Transform>)>() {
        let scale = transform.map_or(1.0, |t| t.scale);
        aabb.world_offset = aabb.local_offset * scale;
        aabb.world_extent = aabb.local_extent * scale;
        if let Some(transform) = transform {
            aabb.center = transform.position + aabb.world_offset;
        }
    }
}

pub fn apply_movement(world: &mut World) {
    for (_entity, (transform, movement)) in world.query_mut::<(&mut Transform, &Movement)>() {
        transform.position += movement.displacement;
    }
}
