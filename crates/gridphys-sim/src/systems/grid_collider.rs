//! Tile-grid collision.
//!
//! Requested displacement is resolved one axis at a time in X, Y, Z order.
//! Each axis sweeps the box along that axis only, against the box already
//! moved by the earlier axes, so a diagonal move cannot slip between two
//! tiles that share a corner. Sensors report contacts but never clamp.
//!
//! Lookups outside the grid read as empty, so bodies at or past the world
//! edge simply move freely.

use std::collections::HashSet;

use glam::{IVec3, Vec3};
use hecs::{Entity, World};
use tracing::trace;

use gridphys_core::components::{Aabb, Collision, GridCollider, GroundState, Movement, Speed};
use gridphys_core::constants::{EMPTY_TILE, TOLERANCE};
use gridphys_core::{Axis, Bounds, CollisionMask};
use gridphys_grid::TileGrid;

use crate::callbacks::CollisionCallbacks;
use crate::events::CollisionEvent;
use crate::resolver::CollisionResolver;

/// Outcome of resolving one body's displacement against the grid.
#[derive(Debug, Default)]
struct Sweep {
    displacement: Vec3,
    clamped: [bool; 3],
    stopped: bool,
    /// Tile type landed on, if the Y axis was clamped while moving down.
    floor: Option<u8>,
    contacts: Vec<(IVec3, u8)>,
}

/// Resolve requested displacement against the tile grid for all entities with a `GridCollider`.
pub fn run(
    world: &mut World,
    grid: &TileGrid,
    resolver: &CollisionResolver,
    callbacks: &mut CollisionCallbacks,
    events: &mut Vec<CollisionEvent>,
) {
    let mut raised = Vec::new();
    // One report per (entity, cell) per tick, whichever axis touched it.
    let mut reported: HashSet<(Entity, IVec3)> = HashSet::new();

    for (entity, (aabb, collider, movement, collision, speed, ground)) in world.query_mut::<(
        &Aabb,
        &GridCollider,
        &mut Movement,
        Option<&Collision>,
        Option<&mut Speed>,
        Option<&mut GroundState>,
    )>() {
        let groups = collision.map_or(CollisionMask::DEFAULT, |c| c.groups);
        let start = Bounds::of(aabb);

        let contacts = if collider.is_sensor {
            sense(grid, resolver, groups, collider.collision_group, &start, movement.displacement)
        } else {
            let sweep = sweep(grid, resolver, groups, collider, &start, movement.displacement);
            movement.displacement = sweep.displacement;

            if let Some(speed) = speed {
                if sweep.stopped {
                    speed.velocity = Vec3::ZERO;
                } else {
                    for axis in Axis::ORDER {
                        if sweep.clamped[axis.index()] {
                            speed.velocity[axis.index()] = 0.0;
                        }
                    }
                }
                if let Some(tile) = sweep.floor {
                    speed.friction = grid.friction_of(tile);
                }
            }
            if let (Some(_), Some(ground)) = (sweep.floor, ground) {
                ground.grid = true;
            }
            sweep.contacts
        };

        for (cell, tile) in contacts {
            if reported.insert((entity, cell)) {
                raised.push(CollisionEvent::Tile { entity, cell, tile });
            }
        }
    }

    if !raised.is_empty() {
        trace!(count = raised.len(), "tile contacts");
    }
    callbacks.dispatch(world, &raised);
    events.extend(raised);
}

fn sweep(
    grid: &TileGrid,
    resolver: &CollisionResolver,
    groups: CollisionMask,
    collider: &GridCollider,
    start: &Bounds,
    requested: Vec3,
) -> Sweep {
    let mut out = Sweep {
        displacement: requested,
        ..Default::default()
    };
    let mut bounds = *start;

    for axis in Axis::ORDER {
        let i = axis.index();
        let wanted = requested[i];
        if wanted == 0.0 {
            continue;
        }

        let hits = blocking_tiles(grid, resolver, groups, collider.collision_group, &bounds, axis, wanted);
        let Some(allowed) = nearest(&hits, wanted) else {
            bounds = bounds.translated(axis.unit() * wanted);
            continue;
        };

        out.contacts.extend(
            hits.iter()
                .filter(|hit| (hit.2 - allowed).abs() <= TOLERANCE)
                .map(|hit| (hit.0, hit.1)),
        );
        out.clamped[i] = true;
        if axis == Axis::Y && wanted < 0.0 {
            out.floor = floor_under(grid, &bounds.translated(axis.unit() * allowed))
                .or_else(|| out.contacts.first().map(|&(_, tile)| tile));
        }

        if collider.stops_on_collide {
            // Axes already resolved keep their movement; this one and later ones stop.
            for later in &Axis::ORDER[i..] {
                out.displacement[later.index()] = 0.0;
            }
            out.stopped = true;
            return out;
        }

        out.displacement[i] = allowed;
        bounds = bounds.translated(axis.unit() * allowed);
    }
    out
}

/// Tile directly below the centre of the footprint of a box resting at `bounds`.
fn floor_under(grid: &TileGrid, bounds: &Bounds) -> Option<u8> {
    let below = Vec3::new(
        bounds.center.x,
        bounds.min().y - 0.5 * grid.scale(),
        bounds.center.z,
    );
    let tile = grid.tile_or_empty(grid.grid_from_position(below));
    (tile != EMPTY_TILE).then_some(tile)
}

/// How far of `wanted` along `axis` a box at `bounds` can travel before it
/// meets a solid tile its masks accept.
pub(crate) fn clamp_to_grid(
    grid: &TileGrid,
    resolver: &CollisionResolver,
    groups: CollisionMask,
    targets: CollisionMask,
    bounds: &Bounds,
    axis: Axis,
    wanted: f32,
) -> f32 {
    if wanted == 0.0 {
        return 0.0;
    }
    let hits = blocking_tiles(grid, resolver, groups, targets, bounds, axis, wanted);
    nearest(&hits, wanted).unwrap_or(wanted)
}

/// Solid, compatible tiles ahead of `bounds` on `axis` and within `wanted`,
/// each with the displacement that would bring the box flush to its face.
fn blocking_tiles(
    grid: &TileGrid,
    resolver: &CollisionResolver,
    groups: CollisionMask,
    targets: CollisionMask,
    bounds: &Bounds,
    axis: Axis,
    wanted: f32,
) -> Vec<(IVec3, u8, f32)> {
    let swept = bounds.swept(axis.unit() * wanted);
    let Some((min, max)) = grid.tile_indices_from_bounds(&swept) else {
        return Vec::new();
    };

    TileGrid::cells(min, max)
        .filter_map(|cell| {
            let tile = grid.tile_or_empty(cell);
            if tile == EMPTY_TILE
                || !resolver.should_collide(groups, targets, grid.group_of(tile), CollisionMask::NONE)
            {
                return None;
            }
            let tile_bounds = grid.tile_bounds(cell);
            let [a, b] = axis.others();
            if !bounds.overlaps_on(&tile_bounds, a) || !bounds.overlaps_on(&tile_bounds, b) {
                return None;
            }
            face_distance(bounds, &tile_bounds, axis, wanted).map(|d| (cell, tile, d))
        })
        .collect()
}

/// Displacement along `axis` that makes `body` touch `tile`, if the tile lies
/// ahead of the body and is reached before `wanted`.
fn face_distance(body: &Bounds, tile: &Bounds, axis: Axis, wanted: f32) -> Option<f32> {
    let i = axis.index();
    let (body_min, body_max) = (body.min()[i], body.max()[i]);
    let (tile_min, tile_max) = (tile.min()[i], tile.max()[i]);

    if wanted > 0.0 && body_max - TOLERANCE <= tile_min {
        let d = tile_min - body_max;
        (d < wanted).then_some(d)
    } else if wanted < 0.0 && body_min + TOLERANCE >= tile_max {
        let d = tile_max - body_min;
        (d > wanted).then_some(d)
    } else {
        None
    }
}

fn nearest(hits: &[(IVec3, u8, f32)], wanted: f32) -> Option<f32> {
    hits.iter().map(|hit| hit.2).reduce(|a, b| {
        if wanted > 0.0 {
            a.min(b)
        } else {
            a.max(b)
        }
    })
}

/// Tiles a sensor passes through this tick. Movement is left untouched.
fn sense(
    grid: &TileGrid,
    resolver: &CollisionResolver,
    groups: CollisionMask,
    targets: CollisionMask,
    start: &Bounds,
    requested: Vec3,
) -> Vec<(IVec3, u8)> {
    let swept = start.swept(requested);
    let Some((min, max)) = grid.tile_indices_from_bounds(&swept) else {
        return Vec::new();
    };

    TileGrid::cells(min, max)
        .filter_map(|cell| {
            let tile = grid.tile_or_empty(cell);
            let solid = tile != EMPTY_TILE
                && resolver.should_collide(groups, targets, grid.group_of(tile), CollisionMask::NONE);
            (solid && grid.tile_bounds(cell).intersects(&swept)).then_some((cell, tile))
        })
        .collect()
}
