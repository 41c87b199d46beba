//! Group/target matching and user-registered collision filters.

use hecs::Entity;

use gridphys_core::{Bounds, CollisionMask};

/// A body as seen by the resolver: where it is and what it can hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    pub entity: Entity,
    pub bounds: Bounds,
    pub groups: CollisionMask,
    pub targets: CollisionMask,
    pub is_sensor: bool,
}

/// Extra veto on body pairs. Both methods must return true for every
/// registered filter or the pair is skipped.
pub trait Filter {
    /// Vetoes the oriented pair `collider -> collidee`.
    fn filter_bounds(&self, _collider: &Collider, _collidee: &Collider) -> bool {
        true
    }

    /// Vetoes a single entity, on either side of a pair or as a query result.
    fn filter_entity(&self, _entity: Entity, _bounds: &Bounds) -> bool {
        true
    }
}

#[derive(Default)]
pub struct CollisionResolver {
    filters: Vec<Box<dyn Filter>>,
}

impl CollisionResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directional: A may hit B when A's targets share a bit with B's groups.
    /// B's targets play no part, so one-way contacts are possible.
    pub fn should_collide(
        &self,
        _groups_a: CollisionMask,
        targets_a: CollisionMask,
        groups_b: CollisionMask,
        _targets_b: CollisionMask,
    ) -> bool {
        targets_a.intersects(groups_b)
    }

    pub fn add_filter<F: Filter + 'static>(&mut self, filter: F) {
        self.filters.push(Box::new(filter));
    }

    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }

    pub fn passes_filters(&self, collider: &Collider, collidee: &Collider) -> bool {
        self.filters.iter().all(|filter| {
            filter.filter_bounds(collider, collidee)
                && filter.filter_entity(collider.entity, &collider.bounds)
                && filter.filter_entity(collidee.entity, &collidee.bounds)
        })
    }

    pub fn passes_entity_filters(&self, entity: Entity, bounds: &Bounds) -> bool {
        self.filters
            .iter()
            .all(|filter| filter.filter_entity(entity, bounds))
    }

    /// Mask match plus filters for the oriented pair, ignoring geometry.
    pub fn accepts(&self, collider: &Collider, collidee: &Collider) -> bool {
        collider.entity != collidee.entity
            && self.should_collide(
                collider.groups,
                collider.targets,
                collidee.groups,
                collidee.targets,
            )
            && self.passes_filters(collider, collidee)
    }

    /// Full oriented test: accepted and overlapping beyond tolerance.
    pub fn collide_bounds(&self, collider: &Collider, collidee: &Collider) -> bool {
        self.accepts(collider, collidee) && collider.bounds.intersects(&collidee.bounds)
    }
}
