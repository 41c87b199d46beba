//! Components that reference other entities and so need the ECS handle type.

use std::collections::HashSet;

use hecs::Entity;

/// Remembers which entities this one has already touched, so a long contact
/// reports once instead of every tick.
#[derive(Debug, Clone, Default)]
pub struct ColliderHistory {
    /// Colliders already reported.
    pub colliders: HashSet<Entity>,
    /// Colliders first seen this tick, in arrival order. Merged by the history system.
    pub new_colliders: Vec<Entity>,
    /// Seconds between full wipes of `colliders`. Zero or less never wipes.
    pub clear_time: f32,
    pub current_clear_time: f32,
}

impl ColliderHistory {
    pub fn new(clear_time: f32) -> Self {
        Self {
            clear_time,
            ..Self::default()
        }
    }

    /// True if `other` has been reported or is pending report.
    pub fn has_seen(&self, other: Entity) -> bool {
        self.colliders.contains(&other) || self.new_colliders.contains(&other)
    }
}
