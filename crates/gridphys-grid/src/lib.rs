//! Voxel tile grid for gridphys.
//!
//! Tile storage, per-type friction and collision-group tables,
//! world/grid coordinate mapping, and ray marching for placement tools.

pub use gridphys_core as core;

pub mod error;
pub mod grid;
pub mod ray;

pub use error::GridError;
pub use grid::TileGrid;
