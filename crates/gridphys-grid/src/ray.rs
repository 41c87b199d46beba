//! Fixed-step ray marching through the tile grid, for placement tooling.

use glam::{IVec3, Vec3};

use gridphys_core::constants::EMPTY_TILE;

use crate::grid::TileGrid;

/// First solid cell on a ray and the distance at which it was reached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub cell: IVec3,
    pub distance: f32,
    /// Last sample taken before the hit. `None` if the ray started in solid ground.
    pub last_clear: Option<Vec3>,
}

impl TileGrid {
    /// March from `origin` along `direction` in steps of `step` until a solid
    /// cell is found or `max_distance` is reached.
    pub fn march_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        step: f32,
    ) -> Option<RayHit> {
        let dir = direction.normalize_or_zero();
        if dir == Vec3::ZERO || step <= 0.0 || self.is_empty() {
            return None;
        }

        let mut distance = 0.0;
        let mut last_clear = None;
        while distance < max_distance {
            let point = origin + dir * distance;
            let cell = self.grid_from_position(point);
            if self.tile_or_empty(cell) != EMPTY_TILE {
                return Some(RayHit {
                    cell,
                    distance,
                    last_clear,
                });
            }
            last_clear = Some(point);
            distance += step;
        }
        None
    }

    /// First solid cell hit by the ray.
    pub fn closest_used_cell_along_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        step: f32,
    ) -> Option<IVec3> {
        self.march_ray(origin, direction, max_distance, step)
            .map(|hit| hit.cell)
    }

    /// World point one step before the first solid cell on the ray.
    ///
    /// `None` if nothing is hit, or if the ray starts inside solid ground.
    pub fn closest_empty_point_along_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        step: f32,
    ) -> Option<Vec3> {
        self.march_ray(origin, direction, max_distance, step)?
            .last_clear
    }

    /// Empty in-grid cell just in front of the first solid cell on the ray.
    pub fn closest_empty_cell_along_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        step: f32,
    ) -> Option<IVec3> {
        let point = self.closest_empty_point_along_ray(origin, direction, max_distance, step)?;
        let cell = self.grid_from_position(point);
        match self.tile_at_index(cell) {
            Ok(EMPTY_TILE) => Some(cell),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridphys_core::constants::RAY_STEP;

    /// 8³ grid, scale 1, solid below y = 2.
    fn make_grid() -> TileGrid {
        let mut grid = TileGrid::new([8, 8, 8], 1.0).unwrap();
        for cell in TileGrid::cells(IVec3::ZERO, IVec3::new(7, 1, 7)) {
            grid.set_tile(cell, 1).unwrap();
        }
        grid
    }

    #[test]
    fn test_ray_down_finds_floor_and_cell_above() {
        let grid = make_grid();
        let origin = Vec3::new(3.5, 6.5, 3.5);

        let used = grid.closest_used_cell_along_ray(origin, -Vec3::Y, 10.0, RAY_STEP);
        assert_eq!(used, Some(IVec3::new(3, 1, 3)));

        let empty = grid.closest_empty_cell_along_ray(origin, -Vec3::Y, 10.0, RAY_STEP);
        assert_eq!(empty, Some(IVec3::new(3, 2, 3)));

        let point = grid
            .closest_empty_point_along_ray(origin, -Vec3::Y, 10.0, RAY_STEP)
            .unwrap();
        assert!(point.y >= 2.0 && point.y < 2.1, "point {point:?}");
    }

    #[test]
    fn test_ray_too_short_returns_none() {
        let grid = make_grid();
        let origin = Vec3::new(3.5, 6.5, 3.5);
        assert!(grid
            .closest_empty_cell_along_ray(origin, -Vec3::Y, 2.0, RAY_STEP)
            .is_none());
    }

    #[test]
    fn test_ray_away_from_grid_returns_none() {
        let grid = make_grid();
        let origin = Vec3::new(3.5, 6.5, 3.5);
        assert!(grid
            .closest_empty_cell_along_ray(origin, Vec3::Y, 50.0, RAY_STEP)
            .is_none());
        assert!(grid
            .closest_empty_cell_along_ray(origin, Vec3::ZERO, 50.0, RAY_STEP)
            .is_none());
    }

    #[test]
    fn test_ray_starting_inside_solid_returns_none() {
        let grid = make_grid();
        let origin = Vec3::new(3.5, 0.5, 3.5);
        assert!(grid
            .closest_empty_cell_along_ray(origin, Vec3::Y, 10.0, RAY_STEP)
            .is_none());
    }

    #[test]
    fn test_ray_entering_solid_from_outside_grid_returns_none() {
        let grid = make_grid();
        // Starts outside the grid at x < 0 and walks straight into solid cell (0, 1, 3).
        let origin = Vec3::new(-0.01, 1.5, 3.5);
        assert!(grid
            .closest_empty_cell_along_ray(origin, Vec3::X, 5.0, RAY_STEP)
            .is_none());
    }
}
