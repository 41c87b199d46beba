//! Snapshot system: serializable view of the world after a tick.
//!
//! This system is read-only; it never modifies the world.

use glam::Vec3;
use hecs::{Entity, World};
use serde::{Deserialize, Serialize};

use gridphys_core::components::{Collision, Speed, Transform};
use gridphys_core::SimTime;

use crate::events::CollisionEvent;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicsSnapshot {
    pub time: SimTime,
    pub bodies: Vec<BodyView>,
    pub events: Vec<EventView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyView {
    pub id: u64,
    pub position: Vec3,
    pub velocity: Vec3,
    pub is_on_floor: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventView {
    Tile { entity: u64, cell: [i32; 3], tile: u8 },
    Sensor { collider: u64, collidee: u64 },
    Blocker { collider: u64, collidee: u64 },
    NewCollider { entity: u64, collider: u64 },
}

impl From<&CollisionEvent> for EventView {
    fn from(event: &CollisionEvent) -> Self {
        match *event {
            CollisionEvent::Tile { entity, cell, tile } => EventView::Tile {
                entity: id(entity),
                cell: cell.to_array(),
                tile,
            },
            CollisionEvent::Sensor { collider, collidee } => EventView::Sensor {
                collider: id(collider),
                collidee: id(collidee),
            },
            CollisionEvent::Blocker { collider, collidee } => EventView::Blocker {
                collider: id(collider),
                collidee: id(collidee),
            },
            CollisionEvent::NewCollider { entity, collider } => EventView::NewCollider {
                entity: id(entity),
                collider: id(collider),
            },
        }
    }
}

fn id(entity: Entity) -> u64 {
    entity.to_bits().get()
}

pub fn build_snapshot(world: &World, time: &SimTime, events: &[CollisionEvent]) -> PhysicsSnapshot {
    let mut bodies: Vec<BodyView> = world
        .query::<(&Transform, Option<&Speed>, Option<&Collision>)>()
        .iter()
        .map(|(entity, (transform, speed, collision))| BodyView {
            id: id(entity),
            position: transform.position,
            velocity: speed.map_or(Vec3::ZERO, |s| s.velocity),
            is_on_floor: collision.is_some_and(|c| c.is_on_floor),
        })
        .collect();
    bodies.sort_by_key(|body| body.id);

    PhysicsSnapshot {
        time: *time,
        bodies,
        events: events.iter().map(EventView::from).collect(),
    }
}
