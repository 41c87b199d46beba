//! Errors raised by direct grid queries and edits.

use thiserror::Error;

/// Failure of a direct tile-grid operation.
///
/// Editing and placement tools are expected to treat `OutOfRange` as a no-op.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    /// Index outside `[0, dims)` on at least one axis.
    #[error("tile index ({x}, {y}, {z}) outside grid of {dims:?}")]
    OutOfRange {
        x: i32,
        y: i32,
        z: i32,
        dims: [usize; 3],
    },
    /// Tile data does not form a full rectangular volume.
    #[error("tile data is ragged: expected {expected} cells, got {actual}")]
    RaggedTiles { expected: usize, actual: usize },
    /// Scale must be finite and positive.
    #[error("invalid tile scale {0}")]
    InvalidScale(f32),
}
