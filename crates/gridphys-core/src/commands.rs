//! Map edits queued by gameplay and tooling, applied between ticks.

use serde::{Deserialize, Serialize};

use crate::masks::CollisionMask;

/// A tile-grid mutation. Never applied while a tick is in flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PhysicsCommand {
    /// Replace the whole grid. `tiles` is x-major: index = (x * dy + y) * dz + z.
    SetTiles { dims: [usize; 3], tiles: Vec<u8> },
    /// Change a single cell.
    SetTile { x: i32, y: i32, z: i32, tile: u8 },
    /// Replace the per-type friction table.
    SetTileFriction { friction: Vec<f32> },
    /// Replace the per-type collision group table.
    SetTileCollisionGroups { groups: Vec<CollisionMask> },
    /// World units per cell.
    SetTileScale { scale: f32 },
}

impl PhysicsCommand {
    /// Variant name, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            PhysicsCommand::SetTiles { .. } => "SetTiles",
            PhysicsCommand::SetTile { .. } => "SetTile",
            PhysicsCommand::SetTileFriction { .. } => "SetTileFriction",
            PhysicsCommand::SetTileCollisionGroups { .. } => "SetTileCollisionGroups",
            PhysicsCommand::SetTileScale { .. } => "SetTileScale",
        }
    }
}
