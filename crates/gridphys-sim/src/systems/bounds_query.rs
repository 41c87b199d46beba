//! Read-only spatial queries over body bounds, for area effects and picking.

use glam::Vec3;
use hecs::{Entity, World};

use gridphys_core::components::{Aabb, Collision};
use gridphys_core::{Bounds, CollisionMask};

use crate::resolver::CollisionResolver;

/// Bodies whose groups match `targets` and whose bounds overlap `area`.
pub fn entities_in_bounds(
    world: &World,
    resolver: &CollisionResolver,
    area: &Bounds,
    targets: CollisionMask,
) -> Vec<Entity> {
    world
        .query::<(&Aabb, &Collision)>()
        .iter()
        .filter_map(|(entity, (aabb, collision))| {
            let bounds = Bounds::of(aabb);
            let hit = resolver.should_collide(CollisionMask::NONE, targets, collision.groups, collision.targets)
                && bounds.intersects(area)
                && resolver.passes_entity_filters(entity, &bounds);
            hit.then_some(entity)
        })
        .collect()
}

/// Nearest body hit by the ray, with the distance along `direction` to its
/// entry face. Bodies containing the origin report distance zero.
pub fn closest_intersect(
    world: &World,
    resolver: &CollisionResolver,
    origin: Vec3,
    direction: Vec3,
    exclude: Option<Entity>,
) -> Option<(Entity, f32)> {
    let direction = direction.try_normalize()?;
    world
        .query::<(&Aabb, &Collision)>()
        .iter()
        .filter(|(entity, _)| Some(*entity) != exclude)
        .filter_map(|(entity, (aabb, _))| {
            let bounds = Bounds::of(aabb);
            if !resolver.passes_entity_filters(entity, &bounds) {
                return None;
            }
            bounds.ray_entry(origin, direction).map(|t| (entity, t))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
}
