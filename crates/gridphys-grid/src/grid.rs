//! TileGrid: voxel store with per-type tables and coordinate mapping.

use glam::{IVec3, Vec3};
use tracing::debug;

use gridphys_core::constants::{DEFAULT_TILE_FRICTION, DEFAULT_TILE_GROUP, EMPTY_TILE, TOLERANCE};
use gridphys_core::{Bounds, CollisionMask};

use crate::error::GridError;

/// Dense 3D grid of tile-type bytes mapped to world space by a uniform scale.
///
/// Cell `(x, y, z)` covers `[x * scale, (x + 1) * scale)` on each axis.
/// Storage is x-major: `(x * dy + y) * dz + z`.
#[derive(Debug, Clone)]
pub struct TileGrid {
    dims: [usize; 3],
    tiles: Vec<u8>,
    scale: f32,
    friction: Vec<f32>,
    groups: Vec<CollisionMask>,
}

impl Default for TileGrid {
    fn default() -> Self {
        Self {
            dims: [0, 0, 0],
            tiles: Vec::new(),
            scale: 1.0,
            friction: vec![0.0, DEFAULT_TILE_FRICTION],
            groups: vec![CollisionMask::NONE, DEFAULT_TILE_GROUP],
        }
    }
}

impl TileGrid {
    /// Create an all-empty grid.
    pub fn new(dims: [usize; 3], scale: f32) -> Result<Self, GridError> {
        let mut grid = Self::default();
        grid.set_scale(scale)?;
        grid.set_tiles(dims, vec![EMPTY_TILE; dims[0] * dims[1] * dims[2]])?;
        Ok(grid)
    }

    /// Replace the tile volume. `tiles.len()` must equal the product of `dims`.
    ///
    /// The friction and group tables grow to cover the largest tile type present;
    /// new slots get the defaults.
    pub fn set_tiles(&mut self, dims: [usize; 3], tiles: Vec<u8>) -> Result<(), GridError> {
        let expected = dims[0] * dims[1] * dims[2];
        if tiles.len() != expected {
            return Err(GridError::RaggedTiles {
                expected,
                actual: tiles.len(),
            });
        }

        let max_type = tiles.iter().copied().max().unwrap_or(EMPTY_TILE) as usize;
        self.dims = dims;
        self.tiles = tiles;
        self.grow_tables(max_type + 1);
        debug!(?dims, max_type, "tile grid replaced");
        Ok(())
    }

    /// Replace the tile volume from nested `[x][y][z]` vectors.
    pub fn set_tiles_nested(&mut self, tiles: &[Vec<Vec<u8>>]) -> Result<(), GridError> {
        let dx = tiles.len();
        let dy = tiles.first().map_or(0, Vec::len);
        let dz = tiles
            .first()
            .and_then(|column| column.first())
            .map_or(0, Vec::len);

        let mut flat = Vec::with_capacity(dx * dy * dz);
        for column in tiles {
            if column.len() != dy {
                return Err(GridError::RaggedTiles {
                    expected: dx * dy * dz,
                    actual: flat.len() + column.iter().map(Vec::len).sum::<usize>(),
                });
            }
            for row in column {
                if row.len() != dz {
                    return Err(GridError::RaggedTiles {
                        expected: dx * dy * dz,
                        actual: flat.len() + row.len(),
                    });
                }
                flat.extend_from_slice(row);
            }
        }
        self.set_tiles([dx, dy, dz], flat)
    }

    fn grow_tables(&mut self, len: usize) {
        if self.friction.len() < len {
            debug!(from = self.friction.len(), to = len, "growing tile friction table");
            self.friction.resize(len, DEFAULT_TILE_FRICTION);
        }
        if self.groups.len() < len {
            debug!(from = self.groups.len(), to = len, "growing tile group table");
            self.groups.resize(len, DEFAULT_TILE_GROUP);
        }
    }

    /// Change a single cell.
    pub fn set_tile(&mut self, index: IVec3, tile: u8) -> Result<(), GridError> {
        let slot = self.slot(index)?;
        self.tiles[slot] = tile;
        self.grow_tables(tile as usize + 1);
        Ok(())
    }

    /// Replace the per-type friction table.
    pub fn set_friction(&mut self, friction: Vec<f32>) {
        self.friction = friction;
    }

    /// Replace the per-type collision group table.
    pub fn set_collision_groups(&mut self, groups: Vec<CollisionMask>) {
        self.groups = groups;
    }

    /// Set world units per cell.
    pub fn set_scale(&mut self, scale: f32) -> Result<(), GridError> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(GridError::InvalidScale(scale));
        }
        self.scale = scale;
        Ok(())
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Highest valid index on each axis.
    fn max_index(&self) -> IVec3 {
        IVec3::new(
            self.dims[0] as i32 - 1,
            self.dims[1] as i32 - 1,
            self.dims[2] as i32 - 1,
        )
    }

    /// World-space center of a cell.
    pub fn position_from_grid(&self, index: IVec3) -> Vec3 {
        (index.as_vec3() + Vec3::splat(0.5)) * self.scale
    }

    /// Cell containing a world position. Exact inverse of [`Self::position_from_grid`].
    pub fn grid_from_position(&self, position: Vec3) -> IVec3 {
        (position / self.scale).floor().as_ivec3()
    }

    pub fn is_index_in_bounds(&self, index: IVec3) -> bool {
        index.cmpge(IVec3::ZERO).all() && index.cmple(self.max_index()).all()
    }

    fn slot(&self, index: IVec3) -> Result<usize, GridError> {
        if !self.is_index_in_bounds(index) {
            return Err(GridError::OutOfRange {
                x: index.x,
                y: index.y,
                z: index.z,
                dims: self.dims,
            });
        }
        let [_, dy, dz] = self.dims;
        Ok((index.x as usize * dy + index.y as usize) * dz + index.z as usize)
    }

    /// Tile type at an index. Fails outside the grid.
    pub fn tile_at_index(&self, index: IVec3) -> Result<u8, GridError> {
        self.slot(index).map(|slot| self.tiles[slot])
    }

    /// Tile type at an index, with anything outside the grid read as empty.
    pub fn tile_or_empty(&self, index: IVec3) -> u8 {
        self.tile_at_index(index).unwrap_or(EMPTY_TILE)
    }

    /// Friction of a tile type. Empty tiles have none; unknown types get the default.
    pub fn friction_of(&self, tile: u8) -> f32 {
        if tile == EMPTY_TILE {
            return 0.0;
        }
        self.friction
            .get(tile as usize)
            .copied()
            .unwrap_or(DEFAULT_TILE_FRICTION)
    }

    /// Collision group of a tile type. Empty tiles belong to no group.
    pub fn group_of(&self, tile: u8) -> CollisionMask {
        if tile == EMPTY_TILE {
            return CollisionMask::NONE;
        }
        self.groups
            .get(tile as usize)
            .copied()
            .unwrap_or(DEFAULT_TILE_GROUP)
    }

    /// World box of a cell.
    pub fn tile_bounds(&self, index: IVec3) -> Bounds {
        Bounds::new(
            self.position_from_grid(index),
            Vec3::splat(self.scale * 0.5),
        )
    }

    /// Inclusive range of cells overlapped by a world box, clamped to the grid.
    ///
    /// Faces lying exactly on a cell edge include the cell on the far side.
    /// Returns `None` when the box is entirely outside the grid on any axis.
    pub fn tile_indices_from_bounds(&self, bounds: &Bounds) -> Option<(IVec3, IVec3)> {
        if self.is_empty() {
            return None;
        }

        let lo = bounds.min() / self.scale - Vec3::splat(TOLERANCE);
        let hi = bounds.max() / self.scale + Vec3::splat(TOLERANCE);
        if !lo.is_finite() || !hi.is_finite() {
            return None;
        }

        for axis in 0..3 {
            let n = self.dims[axis] as f32;
            let below = lo[axis] < 0.0 && hi[axis] < 0.0;
            let above = lo[axis] >= n && hi[axis] >= n;
            if below || above {
                return None;
            }
        }

        let min = lo.floor().as_ivec3().max(IVec3::ZERO);
        let max = hi.floor().as_ivec3().min(self.max_index());
        Some((min, max))
    }

    /// Every cell index in an inclusive range, x-major.
    pub fn cells(min: IVec3, max: IVec3) -> impl Iterator<Item = IVec3> {
        (min.x..=max.x).flat_map(move |x| {
            (min.y..=max.y).flat_map(move |y| (min.z..=max.z).map(move |z| IVec3::new(x, y, z)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// 32³ grid, scale 1, solid below y = 4.
    fn make_floor_grid() -> TileGrid {
        let mut grid = TileGrid::new([32, 32, 32], 1.0).unwrap();
        for cell in TileGrid::cells(IVec3::ZERO, IVec3::new(31, 3, 31)) {
            grid.set_tile(cell, 1).unwrap();
        }
        grid
    }

    #[test]
    fn test_position_from_grid() {
        let grid = make_floor_grid();
        assert_eq!(grid.position_from_grid(IVec3::ZERO), Vec3::splat(0.5));
        assert_eq!(
            grid.position_from_grid(IVec3::new(2, 3, 4)),
            Vec3::new(2.5, 3.5, 4.5)
        );
    }

    #[test]
    fn test_grid_from_position() {
        let grid = make_floor_grid();
        assert_eq!(grid.grid_from_position(Vec3::ZERO), IVec3::ZERO);
        assert_eq!(
            grid.grid_from_position(Vec3::new(2.5, 3.99, 4.0)),
            IVec3::new(2, 3, 4)
        );
        assert_eq!(
            grid.grid_from_position(Vec3::new(-0.5, 0.0, 0.0)),
            IVec3::new(-1, 0, 0)
        );
    }

    #[test]
    fn test_tile_indices_centered_box() {
        let grid = make_floor_grid();
        let bounds = Bounds::new(Vec3::ZERO, Vec3::splat(1.4));
        let (min, max) = grid.tile_indices_from_bounds(&bounds).unwrap();
        assert_eq!(min, IVec3::ZERO);
        assert_eq!(max, IVec3::ONE);
    }

    #[test]
    fn test_tile_indices_small_centered_box() {
        // -0.7 lands in cell -1 and is clamped to 0; 0.7 stays inside cell 0.
        let grid = make_floor_grid();
        let bounds = Bounds::new(Vec3::ZERO, Vec3::splat(0.7));
        let (min, max) = grid.tile_indices_from_bounds(&bounds).unwrap();
        assert_eq!(min, IVec3::ZERO);
        assert_eq!(max, IVec3::ZERO);
    }

    #[test]
    fn test_tile_indices_partially_below_grid() {
        let grid = make_floor_grid();
        let bounds = Bounds::new(Vec3::new(1.4, -1.4, 0.0), Vec3::splat(1.4));
        let (min, max) = grid.tile_indices_from_bounds(&bounds).unwrap();
        assert_eq!(min, IVec3::ZERO);
        assert_eq!(max, IVec3::new(2, 0, 1));
    }

    #[test]
    fn test_tile_indices_boundary_tolerance_includes_far_cell() {
        let grid = make_floor_grid();
        let bounds = Bounds::new(Vec3::new(1.599999, -1.399999, 5.0), Vec3::splat(1.4));
        let (min, max) = grid.tile_indices_from_bounds(&bounds).unwrap();
        assert_eq!(min, IVec3::new(0, 0, 3));
        // Max x edge sits at 2.999999; the tolerance pulls in cell 3.
        assert_eq!(max, IVec3::new(3, 0, 6));
    }

    #[test]
    fn test_tile_indices_exact_edges() {
        let grid = make_floor_grid();
        let bounds =
            Bounds::from_min_max(Vec3::new(1.0, 2.0, -3.0), Vec3::new(16.0, 5.0, 8.0));
        let (min, max) = grid.tile_indices_from_bounds(&bounds).unwrap();
        assert_eq!(min, IVec3::new(0, 1, 0));
        assert_eq!(max, IVec3::new(16, 5, 8));
    }

    #[test]
    fn test_tile_indices_far_outside() {
        let grid = make_floor_grid();
        let bounds = Bounds::new(Vec3::new(0.0, 0.0, 100_000.0), Vec3::splat(1.4));
        assert!(grid.tile_indices_from_bounds(&bounds).is_none());

        let empty = TileGrid::default();
        assert!(empty
            .tile_indices_from_bounds(&Bounds::new(Vec3::ZERO, Vec3::ONE))
            .is_none());
    }

    #[test]
    fn test_tile_at_index_out_of_range() {
        let grid = make_floor_grid();
        assert_eq!(grid.tile_at_index(IVec3::new(0, 0, 0)), Ok(1));
        assert_eq!(grid.tile_at_index(IVec3::new(0, 10, 0)), Ok(0));
        let err = grid.tile_at_index(IVec3::new(32, 0, 0)).unwrap_err();
        assert!(matches!(err, GridError::OutOfRange { x: 32, .. }));
        assert!(grid.tile_at_index(IVec3::new(0, -1, 0)).is_err());
        assert_eq!(grid.tile_or_empty(IVec3::new(-5, 0, 0)), EMPTY_TILE);
    }

    #[test]
    fn test_set_tiles_grows_tables() {
        let mut grid = TileGrid::default();
        grid.set_tiles([2, 1, 1], vec![0, 5]).unwrap();
        assert_eq!(grid.friction_of(5), DEFAULT_TILE_FRICTION);
        assert_eq!(grid.group_of(5), DEFAULT_TILE_GROUP);
        assert_eq!(grid.friction_of(EMPTY_TILE), 0.0);
        assert_eq!(grid.group_of(EMPTY_TILE), CollisionMask::NONE);

        grid.set_friction(vec![0.0, 0.2, 0.4]);
        grid.set_collision_groups(vec![CollisionMask::NONE, CollisionMask::TERRAIN]);
        assert_eq!(grid.friction_of(2), 0.4);
        assert_eq!(grid.group_of(1), CollisionMask::TERRAIN);
        // Types past the end of a replaced table fall back to the defaults.
        assert_eq!(grid.group_of(2), DEFAULT_TILE_GROUP);
    }

    #[test]
    fn test_set_tiles_rejects_ragged_data() {
        let mut grid = TileGrid::default();
        let err = grid.set_tiles([2, 2, 2], vec![0; 7]).unwrap_err();
        assert_eq!(
            err,
            GridError::RaggedTiles {
                expected: 8,
                actual: 7
            }
        );

        let nested = vec![vec![vec![0u8, 1], vec![1, 1]], vec![vec![0u8], vec![1, 1]]];
        assert!(grid.set_tiles_nested(&nested).is_err());

        let nested = vec![vec![vec![0u8, 1], vec![1, 1]], vec![vec![0u8, 2], vec![1, 1]]];
        grid.set_tiles_nested(&nested).unwrap();
        assert_eq!(grid.dims(), [2, 2, 2]);
        assert_eq!(grid.tile_at_index(IVec3::new(1, 0, 1)), Ok(2));
    }

    #[test]
    fn test_set_scale_validates() {
        let mut grid = make_floor_grid();
        assert!(grid.set_scale(0.0).is_err());
        assert!(grid.set_scale(f32::NAN).is_err());
        grid.set_scale(2.0).unwrap();
        assert_eq!(grid.position_from_grid(IVec3::ONE), Vec3::splat(3.0));
        assert_eq!(grid.tile_bounds(IVec3::ZERO).half_extents, Vec3::ONE);
    }

    proptest! {
        #[test]
        fn prop_grid_position_roundtrip(
            x in -1000i32..1000,
            y in -1000i32..1000,
            z in -1000i32..1000,
            scale in 0.1f32..10.0,
        ) {
            let mut grid = TileGrid::default();
            grid.set_scale(scale).unwrap();
            let index = IVec3::new(x, y, z);
            prop_assert_eq!(grid.grid_from_position(grid.position_from_grid(index)), index);
        }
    }
}
