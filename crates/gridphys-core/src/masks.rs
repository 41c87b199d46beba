//! 64-bit collision group / target masks.
//!
//! An entity's `groups` say what it is; its `targets` say what it can hit.
//! A may hit B iff `A.targets & B.groups != 0`. The relation is directional.

use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};

use serde::{Deserialize, Serialize};

/// Fixed-width bitmask of collision categories (at most 64).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollisionMask(pub u64);

impl CollisionMask {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(u64::MAX);

    pub const DEFAULT: Self = Self(1 << 0);
    pub const TERRAIN: Self = Self(1 << 1);
    pub const PLAYER: Self = Self(1 << 2);
    pub const ENEMY: Self = Self(1 << 3);
    pub const PROJECTILE: Self = Self(1 << 4);
    pub const PICKUP: Self = Self(1 << 5);
    pub const TRIGGER: Self = Self(1 << 6);

    /// Mask with only bit `n` set. `n` wraps at 64.
    pub const fn bit(n: u32) -> Self {
        Self(1u64 << (n % 64))
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True if the two masks share at least one bit.
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for CollisionMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for CollisionMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for CollisionMask {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl BitAndAssign for CollisionMask {
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

impl Not for CollisionMask {
    type Output = Self;

    fn not(self) -> Self {
        Self(!self.0)
    }
}

impl From<u64> for CollisionMask {
    fn from(bits: u64) -> Self {
        Self(bits)
    }
}
