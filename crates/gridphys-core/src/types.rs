//! Fundamental geometric and simulation types.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::components::Aabb;
use crate::constants::TOLERANCE;

/// A world axis. Resolution order is always `X`, `Y`, `Z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Fixed per-axis resolution order.
    pub const ORDER: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub const fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// The two axes perpendicular to this one.
    pub const fn others(self) -> [Axis; 2] {
        match self {
            Axis::X => [Axis::Y, Axis::Z],
            Axis::Y => [Axis::X, Axis::Z],
            Axis::Z => [Axis::X, Axis::Y],
        }
    }

    /// Unit vector along this axis.
    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }
}

/// Axis-aligned box in world space: center plus per-axis half-extents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub center: Vec3,
    pub half_extents: Vec3,
}

impl Bounds {
    pub fn new(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            center,
            half_extents,
        }
    }

    /// Box spanning the two corners.
    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        Self {
            center: (min + max) * 0.5,
            half_extents: (max - min).abs() * 0.5,
        }
    }

    /// World box of an entity's AABB component.
    pub fn of(aabb: &Aabb) -> Self {
        Self::new(aabb.center, aabb.world_extent)
    }

    pub fn min(&self) -> Vec3 {
        self.center - self.half_extents
    }

    pub fn max(&self) -> Vec3 {
        self.center + self.half_extents
    }

    /// Same box moved by `offset`.
    pub fn translated(&self, offset: Vec3) -> Self {
        Self::new(self.center + offset, self.half_extents)
    }

    /// Box covering every position the box passes through while moving by `motion`.
    pub fn swept(&self, motion: Vec3) -> Self {
        Self::new(
            self.center + motion * 0.5,
            self.half_extents + (motion * 0.5).abs(),
        )
    }

    /// Overlap on a single axis, ignoring contacts thinner than [`TOLERANCE`].
    pub fn overlaps_on(&self, other: &Bounds, axis: Axis) -> bool {
        let i = axis.index();
        let (min1, max1) = (self.min()[i], self.max()[i]);
        let (min2, max2) = (other.min()[i], other.max()[i]);
        max2 - TOLERANCE > min1 && min2 + TOLERANCE < max1
    }

    /// True if the boxes overlap on all three axes. Touching faces do not count.
    pub fn intersects(&self, other: &Bounds) -> bool {
        Axis::ORDER
            .iter()
            .all(|&axis| self.overlaps_on(other, axis))
    }

    /// Per-axis penetration depth. Non-positive components mean no overlap there.
    pub fn penetration(&self, other: &Bounds) -> Vec3 {
        self.max().min(other.max()) - self.min().max(other.min())
    }

    /// Distance along `dir` at which the ray enters the box (0 if the origin is inside).
    pub fn ray_entry(&self, origin: Vec3, dir: Vec3) -> Option<f32> {
        let min = self.min();
        let max = self.max();
        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;

        for i in 0..3 {
            if dir[i].abs() < f32::EPSILON {
                if origin[i] < min[i] || origin[i] > max[i] {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / dir[i];
            let mut t0 = (min[i] - origin[i]) * inv;
            let mut t1 = (max[i] - origin[i]) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_near = t_near.max(t0);
            t_far = t_far.min(t1);
            if t_near > t_far {
                return None;
            }
        }

        if t_far < 0.0 {
            return None;
        }
        Some(t_near.max(0.0))
    }
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

impl SimTime {
    /// Advance by one tick of length `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        self.tick += 1;
        self.elapsed_secs += dt as f64;
    }
}
