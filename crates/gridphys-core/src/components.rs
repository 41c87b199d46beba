//! ECS components for physics entities.
//!
//! Components are plain data structs with no behavior.
//! Physics logic lives in systems, not components.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::masks::CollisionMask;

/// World transform. Owned by the spatial collaborator, never by a physics system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    /// Uniform scale applied to the entity's local bounds.
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            scale: 1.0,
        }
    }
}

/// Axis-aligned bounding box.
///
/// `world_offset`/`world_extent` are the local values times the transform's
/// uniform scale; `center` is the transform position plus `world_offset`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub center: Vec3,
    pub local_offset: Vec3,
    /// Local half-extents.
    pub local_extent: Vec3,
    pub world_offset: Vec3,
    /// World half-extents.
    pub world_extent: Vec3,
}

/// Acceleration/velocity state integrated by the speed system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Speed {
    /// Single-tick acceleration; reset to zero after each integration.
    pub acceleration: Vec3,
    pub velocity: Vec3,
    /// Per-tick multiplicative decay.
    pub damping: f32,
    /// Contact friction supplied by whatever the entity stands on this tick.
    pub friction: f32,
    /// Friction contributed by the entity itself.
    pub self_friction: f32,
    pub min_friction: f32,
    pub max_friction: f32,
    /// Zero means unclamped.
    pub max_speed_horizontal: f32,
    /// Zero means unclamped.
    pub max_speed_vertical: f32,
    pub horizontal_damped: bool,
    pub vertical_damped: bool,
}

impl Default for Speed {
    fn default() -> Self {
        Self {
            acceleration: Vec3::ZERO,
            velocity: Vec3::ZERO,
            damping: DEFAULT_DAMPING,
            friction: 0.0,
            self_friction: 0.0,
            min_friction: DEFAULT_MIN_FRICTION,
            max_friction: DEFAULT_MAX_FRICTION,
            max_speed_horizontal: 0.0,
            max_speed_vertical: 0.0,
            horizontal_damped: true,
            vertical_damped: true,
        }
    }
}

/// Requested displacement for the current tick. Colliders may clamp it in place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    pub displacement: Vec3,
}

/// Bounds-collision participation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collision {
    pub is_sensor: bool,
    /// What this entity is.
    pub groups: CollisionMask,
    /// What this entity can hit.
    pub targets: CollisionMask,
    /// Friction handed to bodies resting on top of this one.
    pub friction: f32,
    /// Aggregated grounded flag, rewritten at the end of every tick.
    pub is_on_floor: bool,
    /// Requested movement before any collider clamped it.
    pub pre_physics_move: Vec3,
}

impl Default for Collision {
    fn default() -> Self {
        Self {
            is_sensor: false,
            groups: CollisionMask::DEFAULT,
            targets: CollisionMask::DEFAULT,
            friction: DEFAULT_BODY_FRICTION,
            is_on_floor: false,
            pre_physics_move: Vec3::ZERO,
        }
    }
}

/// Tile-grid collision participation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridCollider {
    /// Tile groups this entity collides with.
    pub collision_group: CollisionMask,
    pub is_sensor: bool,
    /// Stop dead on the first contact instead of sliding along the face.
    pub stops_on_collide: bool,
}

impl Default for GridCollider {
    fn default() -> Self {
        Self {
            collision_group: CollisionMask::DEFAULT,
            is_sensor: false,
            stops_on_collide: false,
        }
    }
}

/// Periodically disables and restores an entity's collision targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PulseCollision {
    /// Seconds between toggles.
    pub period: f32,
    pub current_time: f32,
    /// Targets saved while suppressed. `None` while collidable.
    pub saved_targets: Option<CollisionMask>,
}

/// Grounded signal from each collision source for the current tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundState {
    pub grid: bool,
    pub bounds: bool,
    pub rigid_body: bool,
}

/// Constant acceleration re-applied to `Speed` every tick, upstream of physics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gravity {
    pub acceleration: Vec3,
}

impl Default for Gravity {
    fn default() -> Self {
        Self {
            acceleration: Vec3::new(0.0, -GRAVITY, 0.0),
        }
    }
}
