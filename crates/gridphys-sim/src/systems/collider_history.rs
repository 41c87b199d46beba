//! Debounces body contacts.
//!
//! `observe` is subscribed to the bounds collider and queues colliders the
//! entity has not seen yet. `run` advances each entity's wipe timer, then
//! merges the queue and raises one `NewCollider` per merged entity.

use hecs::World;

use crate::components::ColliderHistory;
use crate::events::CollisionEvent;

/// Bounds-collider subscriber.
pub fn observe(world: &mut World, event: &CollisionEvent) {
    let (collider, collidee) = match *event {
        CollisionEvent::Sensor { collider, collidee } | CollisionEvent::Blocker { collider, collidee } => {
            (collider, collidee)
        }
        _ => return,
    };
    if let Ok(mut history) = world.get::<&mut ColliderHistory>(collider) {
        if !history.has_seen(collidee) {
            history.new_colliders.push(collidee);
        }
    }
}

/// Merge this tick's new colliders into every ColliderHistory and expire old ones.
pub fn run(world: &mut World, dt: f32, events: &mut Vec<CollisionEvent>) {
    for (entity, history) in world.query_mut::<&mut ColliderHistory>() {
        if history.clear_time > 0.0 {
            history.current_clear_time += dt;
            if history.current_clear_time >= history.clear_time {
                history.current_clear_time = 0.0;
                history.colliders.clear();
            }
        }

        for collider in std::mem::take(&mut history.new_colliders) {
            history.colliders.insert(collider);
            events.push(CollisionEvent::NewCollider { entity, collider });
        }
    }
}
