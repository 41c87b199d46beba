//! Body-to-body AABB collision.
//!
//! Every unordered pair is tested once against the boxes each body will
//! occupy after its requested movement. Each orientation whose masks and
//! filters accept it gets its own event, so a one-way pair reports once.
//! Sensors only report. Solid pairs are pushed apart along the axis of least
//! penetration, with the correction written back into `Movement`.
//!
//! Corrections are clamped against the tile grid. Whatever one body cannot
//! take because a tile (or a body already pinned against one) is in the way
//! goes to the other body, so a stack resting on the floor pushes only its
//! upper members. Pairs are visited bottom-up for the same reason.

use glam::Vec3;
use hecs::{Entity, World};
use tracing::trace;

use gridphys_core::components::{Aabb, Collision, GridCollider, GroundState, Movement, Speed};
use gridphys_core::constants::TOLERANCE;
use gridphys_core::{Axis, Bounds, CollisionMask};
use gridphys_grid::TileGrid;

use crate::callbacks::CollisionCallbacks;
use crate::events::CollisionEvent;
use crate::resolver::{Collider, CollisionResolver};
use crate::systems::grid_collider;

struct Body {
    collider: Collider,
    /// Requested displacement, `None` for bodies that cannot be moved.
    displacement: Option<Vec3>,
    /// Tile groups this body is clamped against, if it collides with the grid.
    tile_targets: Option<CollisionMask>,
    friction: f32,
    correction: Vec3,
    /// Friction of whatever this body was pushed up onto.
    landed_on: Option<f32>,
    /// Directions per axis (`[negative, positive]`) this body cannot be pushed.
    blocked: [[bool; 2]; 3],
}

impl Body {
    fn predicted(&self) -> Collider {
        let offset = self.displacement.unwrap_or(Vec3::ZERO) + self.correction;
        Collider {
            bounds: self.collider.bounds.translated(offset),
            ..self.collider
        }
    }

    fn is_blocked(&self, axis: Axis, direction: f32) -> bool {
        self.blocked[axis.index()][usize::from(direction > 0.0)]
    }

    fn block(&mut self, axis: Axis, direction: f32) {
        self.blocked[axis.index()][usize::from(direction > 0.0)] = true;
    }

    /// Move by up to `amount` along `axis`, stopping at the first solid tile.
    /// Returns the distance covered and whether a tile cut it short.
    fn shift(&mut self, grid: &TileGrid, resolver: &CollisionResolver, axis: Axis, amount: f32) -> (f32, bool) {
        let allowed = match self.tile_targets {
            Some(targets) => grid_collider::clamp_to_grid(
                grid,
                resolver,
                self.collider.groups,
                targets,
                &self.predicted().bounds,
                axis,
                amount,
            ),
            None => amount,
        };
        self.correction += axis.unit() * allowed;
        (allowed.abs(), (amount - allowed).abs() > TOLERANCE)
    }
}

/// Detect and resolve overlaps between all pairs of entities with `Aabb` + `Collision`.
pub fn run(
    world: &mut World,
    grid: &TileGrid,
    resolver: &CollisionResolver,
    callbacks: &mut CollisionCallbacks,
    events: &mut Vec<CollisionEvent>,
) {
    let mut bodies: Vec<Body> = world
        .query::<(
            &Aabb,
            &Collision,
            Option<&Movement>,
            Option<&GridCollider>,
            Option<&GroundState>,
        )>()
        .iter()
        .map(|(entity, (aabb, collision, movement, grid_collider, ground))| {
            let mut blocked = [[false; 2]; 3];
            // Already standing on a tile this tick.
            blocked[Axis::Y.index()][0] = ground.is_some_and(|g| g.grid);
            Body {
                collider: Collider {
                    entity,
                    bounds: Bounds::of(aabb),
                    groups: collision.groups,
                    targets: collision.targets,
                    is_sensor: collision.is_sensor,
                },
                displacement: movement.map(|m| m.displacement),
                tile_targets: grid_collider
                    .filter(|c| !c.is_sensor)
                    .map(|c| c.collision_group),
                friction: collision.friction,
                correction: Vec3::ZERO,
                landed_on: None,
                blocked,
            }
        })
        .collect();

    bodies.sort_by(|a, b| {
        let (a, b) = (a.predicted(), b.predicted());
        a.bounds
            .min()
            .y
            .total_cmp(&b.bounds.min().y)
            .then_with(|| a.entity.to_bits().cmp(&b.entity.to_bits()))
    });

    let mut raised = Vec::new();
    for i in 0..bodies.len() {
        for j in (i + 1)..bodies.len() {
            let a = bodies[i].predicted();
            let b = bodies[j].predicted();

            let a_hits_b = resolver.accepts(&a, &b);
            let b_hits_a = resolver.accepts(&b, &a);
            if !(a_hits_b || b_hits_a) || !a.bounds.intersects(&b.bounds) {
                continue;
            }

            if a.is_sensor || b.is_sensor {
                if a_hits_b {
                    raised.push(CollisionEvent::Sensor { collider: a.entity, collidee: b.entity });
                }
                if b_hits_a {
                    raised.push(CollisionEvent::Sensor { collider: b.entity, collidee: a.entity });
                }
                continue;
            }

            if a_hits_b {
                raised.push(CollisionEvent::Blocker { collider: a.entity, collidee: b.entity });
            }
            if b_hits_a {
                raised.push(CollisionEvent::Blocker { collider: b.entity, collidee: a.entity });
            }
            separate(&mut bodies, i, j, a_hits_b, b_hits_a, grid, resolver);
        }
    }

    write_back(world, &bodies);

    if !raised.is_empty() {
        trace!(count = raised.len(), "bounds contacts");
    }
    callbacks.dispatch(world, &raised);
    events.extend(raised);
}

/// Push `i` and `j` apart along the axis of least penetration. A body only
/// yields if it can move, it is the one doing the hitting, and nothing pins
/// it on that side. When both yield the correction is split evenly; any part
/// one side cannot take is handed to the other.
fn separate(
    bodies: &mut [Body],
    i: usize,
    j: usize,
    a_hits_b: bool,
    b_hits_a: bool,
    grid: &TileGrid,
    resolver: &CollisionResolver,
) {
    let a = bodies[i].predicted();
    let b = bodies[j].predicted();

    let depth = a.bounds.penetration(&b.bounds);
    let axis = Axis::ORDER
        .into_iter()
        .reduce(|best, axis| {
            if depth[axis.index()] < depth[best.index()] {
                axis
            } else {
                best
            }
        })
        .unwrap_or(Axis::Y);
    let depth = depth[axis.index()];

    // Direction `a` is pushed. Coincident centers push `a` toward +axis.
    let dir_a = if a.bounds.center[axis.index()] >= b.bounds.center[axis.index()] { 1.0 } else { -1.0 };
    let dir_b = -dir_a;

    let a_yields = a_hits_b && bodies[i].displacement.is_some() && !bodies[i].is_blocked(axis, dir_a);
    let b_yields = b_hits_a && bodies[j].displacement.is_some() && !bodies[j].is_blocked(axis, dir_b);
    let share_a = match (a_yields, b_yields) {
        (true, true) => 0.5,
        (true, false) => 1.0,
        (false, true) => 0.0,
        (false, false) => return,
    };

    let (mut moved_a, mut a_stuck) = (0.0, !a_yields);
    if a_yields {
        (moved_a, a_stuck) = bodies[i].shift(grid, resolver, axis, dir_a * depth * share_a);
    }
    let (mut moved_b, mut b_stuck) = (0.0, !b_yields);
    if b_yields {
        (moved_b, b_stuck) = bodies[j].shift(grid, resolver, axis, dir_b * (depth - moved_a));
    }
    let rest = depth - moved_a - moved_b;
    if a_yields && !a_stuck && rest > TOLERANCE {
        let (extra, stuck) = bodies[i].shift(grid, resolver, axis, dir_a * rest);
        moved_a += extra;
        a_stuck = stuck;
    }

    // A body resting against one that cannot give way is pinned toward it.
    if a_stuck {
        bodies[j].block(axis, dir_a);
    }
    if b_stuck {
        bodies[i].block(axis, dir_b);
    }

    let friction_a = bodies[i].friction;
    let friction_b = bodies[j].friction;
    if axis == Axis::Y {
        if dir_a > 0.0 && moved_a > 0.0 {
            bodies[i].landed_on = Some(friction_b);
        }
        if dir_b > 0.0 && moved_b > 0.0 {
            bodies[j].landed_on = Some(friction_a);
        }
    }
}

fn write_back(world: &mut World, bodies: &[Body]) {
    for body in bodies {
        let entity: Entity = body.collider.entity;
        if body.correction != Vec3::ZERO {
            if let Ok(mut movement) = world.get::<&mut Movement>(entity) {
                movement.displacement += body.correction;
            }
            if let Ok(mut speed) = world.get::<&mut Speed>(entity) {
                for axis in Axis::ORDER {
                    let k = axis.index();
                    // Stop motion that points back into what we were pushed out of.
                    if speed.velocity[k] * body.correction[k] < 0.0 {
                        speed.velocity[k] = 0.0;
                    }
                }
                if let Some(friction) = body.landed_on {
                    speed.friction = friction;
                }
            }
        }
        if body.landed_on.is_some() {
            if let Ok(mut ground) = world.get::<&mut GroundState>(entity) {
                ground.bounds = true;
            }
        }
    }
}
