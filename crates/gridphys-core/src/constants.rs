//! Simulation constants and tuning defaults.

use crate::masks::CollisionMask;

/// Default logic tick rate (Hz).
pub const TICK_RATE: u32 = 60;

/// Seconds per tick at the default tick rate.
pub const DT: f32 = 1.0 / TICK_RATE as f32;

/// Floating-point tolerance in grid units.
///
/// Subtracted from the low edge and added to the high edge of a box before
/// it is mapped to tile indices, so a face lying exactly on a cell boundary
/// also picks up the neighbouring cell. Also used as the contact slop when
/// testing axis overlap. 1e-5 keeps the `1.599999 + 1.4` style cases inside
/// the far cell while staying well below any meaningful displacement.
pub const TOLERANCE: f32 = 0.000_01;

/// Step length (world units) used when marching rays through the grid.
pub const RAY_STEP: f32 = 0.05;

// --- Tiles ---

/// Tile type that is always empty.
pub const EMPTY_TILE: u8 = 0;

/// Friction assigned to tile types without an explicit entry.
pub const DEFAULT_TILE_FRICTION: f32 = 1.0;

/// Collision group assigned to tile types without an explicit entry.
pub const DEFAULT_TILE_GROUP: CollisionMask = CollisionMask::DEFAULT;

// --- Speed defaults ---

/// Per-tick velocity multiplier (1.0 = no damping).
pub const DEFAULT_DAMPING: f32 = 1.0;

/// Lower bound of the floor friction factor.
pub const DEFAULT_MIN_FRICTION: f32 = 0.0;

/// Upper bound of the floor friction factor.
pub const DEFAULT_MAX_FRICTION: f32 = 1.0;

/// Friction of a collision body when nothing else is set.
pub const DEFAULT_BODY_FRICTION: f32 = 1.0;

/// Default downward acceleration (world units / s²). +Y is up.
pub const GRAVITY: f32 = 9.81;
