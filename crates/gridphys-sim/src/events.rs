//! Collision notifications raised by the collider systems.

use glam::IVec3;
use hecs::Entity;

/// One collision observed during a tick. `collider` is always the entity
/// whose targets matched; the other side never receives the mirrored event
/// unless its own targets match too.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionEvent {
    /// A grid collider touched a solid, compatible tile.
    Tile { entity: Entity, cell: IVec3, tile: u8 },
    /// Overlap involving a sensor. No separation was applied.
    Sensor { collider: Entity, collidee: Entity },
    /// Two solid bodies overlapped and were pushed apart.
    Blocker { collider: Entity, collidee: Entity },
    /// Raised by the history system the first time `collider` touches `entity`
    /// since the last wipe.
    NewCollider { entity: Entity, collider: Entity },
}

impl CollisionEvent {
    /// The entity the event is addressed to.
    pub fn subject(&self) -> Entity {
        match *self {
            CollisionEvent::Tile { entity, .. } => entity,
            CollisionEvent::Sensor { collider, .. } => collider,
            CollisionEvent::Blocker { collider, .. } => collider,
            CollisionEvent::NewCollider { entity, .. } => entity,
        }
    }

    /// The other entity in a body-to-body event.
    pub fn other(&self) -> Option<Entity> {
        match *self {
            CollisionEvent::Tile { .. } => None,
            CollisionEvent::Sensor { collidee, .. } => Some(collidee),
            CollisionEvent::Blocker { collidee, .. } => Some(collidee),
            CollisionEvent::NewCollider { collider, .. } => Some(collider),
        }
    }
}
