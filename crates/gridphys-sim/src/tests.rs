//! Tests for the physics pipeline, the engine, and their interaction.

use std::cell::RefCell;
use std::rc::Rc;

use glam::{IVec3, Vec3};
use hecs::{Entity, World};

use gridphys_core::commands::PhysicsCommand;
use gridphys_core::components::*;
use gridphys_core::{Bounds, CollisionMask};

use crate::components::ColliderHistory;
use crate::config::{PhysicsConfig, SimConfig};
use crate::engine::SimulationEngine;
use crate::events::CollisionEvent;
use crate::pipeline::PhysicsPipeline;
use crate::resolver::Filter;
use crate::rigid_body::{RigidBodyBackend, StaticMesh, StaticObjectId};
use crate::systems::snapshot::EventView;
use crate::world_setup;

const DIMS: [usize; 3] = [16, 16, 16];

fn engine_with_floor(seed: u64) -> SimulationEngine {
    let mut engine = SimulationEngine::new(SimConfig {
        seed,
        ..Default::default()
    });
    engine.queue_command(PhysicsCommand::SetTiles {
        dims: DIMS,
        tiles: world_setup::flat_floor_tiles(DIMS, 4),
    });
    engine
}

/// Ten ticks per second, so timers advance in steps of 0.1.
fn slow_pipeline() -> PhysicsPipeline {
    PhysicsPipeline::new(PhysicsConfig {
        tick_rate: 10,
        ..Default::default()
    })
}

fn static_box(world: &mut World, center: Vec3, collision: Collision) -> Entity {
    world.spawn((
        Aabb {
            center,
            local_extent: Vec3::splat(0.5),
            world_extent: Vec3::splat(0.5),
            ..Default::default()
        },
        collision,
    ))
}

fn tick(pipeline: &mut PhysicsPipeline, world: &mut World) -> Vec<CollisionEvent> {
    let events = pipeline.tick(world);
    pipeline.cleanup(world);
    events
}

// ---- Settling ----

#[test]
fn test_body_settles_on_floor() {
    let mut engine = engine_with_floor(1);
    let body = engine.spawn_body(Vec3::new(8.0, 8.0, 8.0), Vec3::splat(0.5));

    for _ in 0..240 {
        engine.tick();
    }

    let rest = engine.world().get::<&Transform>(body).unwrap().position;
    assert!((rest.y - 4.5).abs() < 1e-4, "resting at {rest}");
    assert!(engine.world().get::<&Collision>(body).unwrap().is_on_floor);

    for _ in 0..10 {
        let snapshot = engine.tick();
        let view = snapshot.bodies.iter().find(|b| b.id == body.to_bits().get()).unwrap();
        assert!((view.position.y - rest.y).abs() < 1e-5, "drifted to {}", view.position);
        assert!(view.is_on_floor);
    }
}

#[test]
fn test_body_rests_on_static_block() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    let block = world_setup::spawn_static_block(
        engine.world_mut(),
        Vec3::new(0.0, 6.0, 0.0),
        Vec3::splat(0.5),
    );
    let body = engine.spawn_body(Vec3::new(0.0, 9.0, 0.0), Vec3::splat(0.5));

    let mut blocked = false;
    for _ in 0..240 {
        let snapshot = engine.tick();
        blocked |= snapshot.events.iter().any(|e| {
            *e == EventView::Blocker {
                collider: body.to_bits().get(),
                collidee: block.to_bits().get(),
            }
        });
    }

    assert!(blocked);
    let rest = engine.world().get::<&Transform>(body).unwrap().position;
    assert!((rest.y - 7.0).abs() < 1e-4, "resting at {rest}");
    assert!(engine.world().get::<&Collision>(body).unwrap().is_on_floor);
    assert_eq!(
        engine.world().get::<&Transform>(block).unwrap().position,
        Vec3::new(0.0, 6.0, 0.0)
    );
}

fn position(engine: &SimulationEngine, entity: Entity) -> Vec3 {
    engine.world().get::<&Transform>(entity).unwrap().position
}

/// Step until settled, failing if any body ever dips below `floor`.
fn settle(engine: &mut SimulationEngine, bodies: &[Entity], ticks: usize, floor: f32) {
    for t in 0..ticks {
        engine.tick();
        for &body in bodies {
            let at = position(engine, body);
            assert!(at.y >= floor - 1e-4, "tick {t}: body sank to {at}");
        }
    }
}

#[test]
fn test_stacked_bodies_rest_on_each_other() {
    let mut engine = engine_with_floor(1);
    let bottom = engine.spawn_body(Vec3::new(8.0, 4.5, 8.0), Vec3::splat(0.5));
    let top = engine.spawn_body(Vec3::new(8.0, 6.0, 8.0), Vec3::splat(0.5));

    settle(&mut engine, &[bottom, top], 600, 4.5);

    let (b, t) = (position(&engine, bottom), position(&engine, top));
    assert!((b.y - 4.5).abs() < 1e-4, "bottom at {b}");
    assert!((t.y - 5.5).abs() < 1e-4, "top at {t}");
    assert!(engine.world().get::<&Collision>(top).unwrap().is_on_floor);
}

#[test]
fn test_pile_of_three_settles_and_stops() {
    let mut engine = engine_with_floor(1);
    let pile: Vec<Entity> = [4.5, 6.0, 7.5]
        .into_iter()
        .map(|y| engine.spawn_body(Vec3::new(8.0, y, 8.0), Vec3::splat(0.5)))
        .collect();

    settle(&mut engine, &pile, 600, 4.5);

    let rest: Vec<Vec3> = pile.iter().map(|&e| position(&engine, e)).collect();
    for (level, at) in rest.iter().enumerate() {
        assert!((at.y - (4.5 + level as f32)).abs() < 1e-3, "level {level} at {at}");
    }
    for _ in 0..10 {
        engine.tick();
        for (&body, before) in pile.iter().zip(&rest) {
            let now = position(&engine, body);
            assert!(now.distance(*before) < 1e-4, "drifted from {before} to {now}");
        }
    }
}

#[test]
fn test_body_shoved_into_wall_stays_out_of_it() {
    let mut engine = engine_with_floor(1);
    // Wall face at x = 10, rising from the floor.
    engine.queue_commands((4..8).flat_map(|y| (0..16).map(move |z| PhysicsCommand::SetTile { x: 10, y, z, tile: 1 })));
    let pinned = engine.spawn_body(Vec3::new(9.5, 4.5, 8.0), Vec3::splat(0.5));
    let pusher = engine.spawn_body(Vec3::new(8.4, 4.5, 8.0), Vec3::splat(0.5));
    engine
        .world_mut()
        .get::<&mut Speed>(pusher)
        .unwrap()
        .velocity
        .x = 12.0;

    for t in 0..120 {
        engine.tick();
        let at = position(&engine, pinned);
        assert!(at.x <= 9.5 + 1e-4, "tick {t}: pinned body entered the wall at {at}");
        assert!(at.y >= 4.5 - 1e-4, "tick {t}: pinned body sank to {at}");
    }

    let (p, q) = (position(&engine, pinned), position(&engine, pusher));
    assert!(q.x <= p.x - 1.0 + 1e-4, "pusher overlaps at {q}, pinned at {p}");
    assert!((q.y - 4.5).abs() < 1e-4, "pusher at {q}");
}

#[test]
fn test_pre_physics_move_keeps_request() {
    let mut pipeline = PhysicsPipeline::default();
    pipeline
        .set_tiles(DIMS, world_setup::flat_floor_tiles(DIMS, 4))
        .unwrap();
    let mut world = World::new();
    let body = world.spawn((
        Aabb {
            center: Vec3::new(8.0, 4.55, 8.0),
            local_extent: Vec3::splat(0.5),
            world_extent: Vec3::splat(0.5),
            ..Default::default()
        },
        Speed {
            velocity: Vec3::new(0.0, -6.0, 0.0),
            ..Default::default()
        },
        Movement::default(),
        Collision::default(),
        GridCollider::default(),
    ));

    pipeline.tick(&mut world);

    let requested = world.get::<&Collision>(body).unwrap().pre_physics_move;
    let resolved = world.get::<&Movement>(body).unwrap().displacement;
    assert!((requested.y + 0.1).abs() < 1e-5);
    assert!((resolved.y + 0.05).abs() < 1e-4, "resolved {resolved}");
    assert!(world.get::<&Collision>(body).unwrap().is_on_floor);
}

// ---- Determinism ----

fn scatter_region() -> Bounds {
    Bounds::new(Vec3::new(8.0, 10.0, 8.0), Vec3::new(5.0, 4.0, 5.0))
}

#[test]
fn test_determinism_same_seed() {
    let mut engine_a = engine_with_floor(12345);
    let mut engine_b = engine_with_floor(12345);
    engine_a.scatter_bodies(20, &scatter_region());
    engine_b.scatter_bodies(20, &scatter_region());

    for _ in 0..180 {
        let json_a = serde_json::to_string(&engine_a.tick()).unwrap();
        let json_b = serde_json::to_string(&engine_b.tick()).unwrap();
        assert_eq!(json_a, json_b, "Snapshots diverged with same seed");
    }
}

#[test]
fn test_determinism_different_seeds() {
    let mut engine_a = engine_with_floor(111);
    let mut engine_b = engine_with_floor(222);
    engine_a.scatter_bodies(20, &scatter_region());
    engine_b.scatter_bodies(20, &scatter_region());

    let json_a = serde_json::to_string(&engine_a.tick()).unwrap();
    let json_b = serde_json::to_string(&engine_b.tick()).unwrap();
    assert_ne!(json_a, json_b, "Different seeds should scatter differently");
}

#[test]
fn test_tick_advances_time() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    for _ in 0..60 {
        engine.tick();
    }
    assert_eq!(engine.time().tick, 60);
    assert!((engine.time().elapsed_secs - 1.0).abs() < 1e-4);
}

// ---- Dispatch ----

#[test]
fn test_one_way_pair_dispatches_once() {
    let mut pipeline = PhysicsPipeline::default();
    let mut world = World::new();
    let a = static_box(
        &mut world,
        Vec3::ZERO,
        Collision {
            groups: CollisionMask::PLAYER,
            targets: CollisionMask::ENEMY,
            ..Default::default()
        },
    );
    let b = static_box(
        &mut world,
        Vec3::new(0.5, 0.0, 0.0),
        Collision {
            groups: CollisionMask::ENEMY,
            targets: CollisionMask::NONE,
            ..Default::default()
        },
    );

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    pipeline.add_collision_callbacks(move |_, event| sink.borrow_mut().push(*event));

    tick(&mut pipeline, &mut world);

    assert_eq!(
        *seen.borrow(),
        vec![CollisionEvent::Blocker { collider: a, collidee: b }]
    );
}

#[test]
fn test_callbacks_receive_tile_and_body_events() {
    let mut pipeline = PhysicsPipeline::default();
    pipeline
        .set_tiles(DIMS, world_setup::flat_floor_tiles(DIMS, 4))
        .unwrap();
    let mut world = World::new();
    world_setup::spawn_body(&mut world, Vec3::new(8.0, 4.5, 8.0), Vec3::splat(0.5));
    world_setup::spawn_body(&mut world, Vec3::new(8.6, 4.5, 8.0), Vec3::splat(0.5));

    let tiles = Rc::new(RefCell::new(0));
    let bodies = Rc::new(RefCell::new(0));
    let (t, b) = (Rc::clone(&tiles), Rc::clone(&bodies));
    pipeline.add_collision_callbacks(move |_, event| match event {
        CollisionEvent::Tile { .. } => *t.borrow_mut() += 1,
        _ => *b.borrow_mut() += 1,
    });

    // Gravity is an engine concern; push the bodies down by hand.
    for (_, speed) in world.query_mut::<&mut Speed>() {
        speed.velocity.y = -1.0;
    }
    tick(&mut pipeline, &mut world);

    assert!(*tiles.borrow() > 0);
    assert_eq!(*bodies.borrow(), 2);
}

struct Ignore(Entity);

impl Filter for Ignore {
    fn filter_entity(&self, entity: Entity, _bounds: &Bounds) -> bool {
        entity != self.0
    }
}

#[test]
fn test_filter_vetoes_pair() {
    let mut pipeline = PhysicsPipeline::default();
    let mut world = World::new();
    static_box(&mut world, Vec3::ZERO, Collision::default());
    let ghost = static_box(&mut world, Vec3::new(0.5, 0.0, 0.0), Collision::default());
    pipeline.add_filter(Ignore(ghost));

    let events = tick(&mut pipeline, &mut world);
    assert!(events.is_empty());
}

// ---- History ----

#[test]
fn test_history_reports_once_per_clear_window() {
    let mut pipeline = slow_pipeline();
    let mut world = World::new();
    let sensor = static_box(
        &mut world,
        Vec3::ZERO,
        Collision {
            is_sensor: true,
            ..Default::default()
        },
    );
    world.insert_one(sensor, ColliderHistory::new(0.5)).unwrap();
    let visitor = static_box(&mut world, Vec3::new(0.5, 0.0, 0.0), Collision::default());

    let new_colliders = |events: &[CollisionEvent]| {
        events
            .iter()
            .filter(|e| **e == CollisionEvent::NewCollider { entity: sensor, collider: visitor })
            .count()
    };

    let first: usize = (0..3)
        .map(|_| new_colliders(&tick(&mut pipeline, &mut world)))
        .sum();
    assert_eq!(first, 1);

    // The wipe lands on tick 5; the contact is new again on tick 6.
    let per_tick: Vec<usize> = (3..8)
        .map(|_| new_colliders(&tick(&mut pipeline, &mut world)))
        .collect();
    assert_eq!(per_tick, vec![0, 0, 1, 0, 0]);
}

#[test]
fn test_trigger_volume_reports_falling_body_once() {
    let mut engine = engine_with_floor(3);
    let trigger = world_setup::spawn_sensor(
        engine.world_mut(),
        Vec3::new(8.0, 6.0, 8.0),
        Vec3::new(2.0, 0.5, 2.0),
        CollisionMask::DEFAULT,
        0.0,
    );
    let body = engine.spawn_body(Vec3::new(8.0, 8.0, 8.0), Vec3::splat(0.5));

    let expected = EventView::NewCollider {
        entity: trigger.to_bits().get(),
        collider: body.to_bits().get(),
    };
    let reports: usize = (0..240)
        .map(|_| engine.tick().events.iter().filter(|e| **e == expected).count())
        .sum();

    assert_eq!(reports, 1);
    let rest = engine.world().get::<&Transform>(body).unwrap().position;
    assert!((rest.y - 4.5).abs() < 1e-4, "sensor must not hold the body up");
}

// ---- Pulse ----

#[test]
fn test_pulse_suppresses_contacts() {
    let mut pipeline = slow_pipeline();
    let mut world = World::new();
    let pulsing = static_box(
        &mut world,
        Vec3::ZERO,
        Collision {
            targets: CollisionMask::ENEMY,
            ..Default::default()
        },
    );
    world
        .insert_one(
            pulsing,
            PulseCollision {
                period: 1.0,
                ..Default::default()
            },
        )
        .unwrap();
    static_box(
        &mut world,
        Vec3::new(0.5, 0.0, 0.0),
        Collision {
            groups: CollisionMask::ENEMY,
            targets: CollisionMask::NONE,
            ..Default::default()
        },
    );

    for tick_number in 1..=20 {
        let hits = tick(&mut pipeline, &mut world)
            .iter()
            .filter(|e| e.subject() == pulsing)
            .count();
        let targets = world.get::<&Collision>(pulsing).unwrap().targets;
        match tick_number {
            1..=9 => {
                assert_eq!(hits, 1, "tick {tick_number}");
                assert_eq!(targets, CollisionMask::ENEMY);
            }
            10..=19 => {
                assert_eq!(hits, 0, "tick {tick_number}");
                assert!(targets.is_empty());
            }
            _ => {
                assert_eq!(hits, 1, "tick {tick_number}");
                assert_eq!(targets, CollisionMask::ENEMY);
            }
        }
    }
}

// ---- Commands and queries ----

#[test]
fn test_commands_apply_between_ticks() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    engine.queue_commands([
        PhysicsCommand::SetTile { x: 99, y: 0, z: 0, tile: 1 },
        PhysicsCommand::SetTiles {
            dims: DIMS,
            tiles: world_setup::flat_floor_tiles(DIMS, 4),
        },
        PhysicsCommand::SetTileScale { scale: -1.0 },
        PhysicsCommand::SetTile { x: 2, y: 8, z: 2, tile: 3 },
        PhysicsCommand::SetTileFriction {
            friction: vec![0.0, 0.5, 0.5, 0.1],
        },
    ]);
    assert!(engine.pipeline().grid().is_empty());

    engine.tick();

    let pipeline = engine.pipeline();
    assert_eq!(pipeline.grid().dims(), DIMS);
    assert_eq!(pipeline.grid().scale(), 1.0);
    assert_eq!(pipeline.tile_at_index(IVec3::new(2, 8, 2)), Ok(3));
    assert_eq!(pipeline.grid().friction_of(3), 0.1);
    assert!(pipeline.tile_at_index(IVec3::new(99, 0, 0)).is_err());
}

#[test]
fn test_closest_empty_cell_uses_configured_step() {
    let mut pipeline = PhysicsPipeline::default();
    pipeline
        .set_tiles(DIMS, world_setup::flat_floor_tiles(DIMS, 4))
        .unwrap();

    let cell = pipeline.closest_empty_cell_along_ray(Vec3::new(8.5, 10.5, 8.5), Vec3::NEG_Y, 20.0);
    assert_eq!(cell, Some(IVec3::new(8, 4, 8)));
    assert_eq!(pipeline.position_from_grid(IVec3::new(8, 4, 8)), Vec3::new(8.5, 4.5, 8.5));
}

#[test]
fn test_pipeline_bounds_queries() {
    let pipeline = PhysicsPipeline::default();
    let mut world = World::new();
    let target = static_box(&mut world, Vec3::new(3.0, 0.0, 0.0), Collision::default());

    let area = Bounds::new(Vec3::new(3.0, 0.0, 0.0), Vec3::ONE);
    assert_eq!(
        pipeline.entities_in_bounds(&world, &area, CollisionMask::DEFAULT),
        vec![target]
    );
    let hit = pipeline.closest_intersect(&world, Vec3::ZERO, Vec3::X, None);
    assert_eq!(hit.map(|(e, _)| e), Some(target));
}

#[test]
fn test_snapshot_serializes_tagged_events() {
    let mut engine = engine_with_floor(5);
    engine.spawn_body(Vec3::new(8.0, 4.5, 8.0), Vec3::splat(0.5));

    let snapshot = engine.tick();
    let json = serde_json::to_value(&snapshot).unwrap();

    assert_eq!(json["bodies"].as_array().unwrap().len(), 1);
    assert_eq!(json["time"]["tick"], 1);
    assert!(json["events"]
        .as_array()
        .unwrap()
        .iter()
        .any(|e| e["type"] == "Tile"));
}

// ---- Rigid-body seam ----

#[derive(Default)]
struct GroundEverything {
    statics: Vec<StaticObjectId>,
}

impl RigidBodyBackend for GroundEverything {
    fn step(&mut self, world: &mut World, _dt: f32) -> Vec<Entity> {
        world.query::<&Collision>().iter().map(|(e, _)| e).collect()
    }

    fn add_static_object(&mut self, _mesh: StaticMesh) -> StaticObjectId {
        let id = StaticObjectId(self.statics.len() as u64);
        self.statics.push(id);
        id
    }

    fn remove_static_object(&mut self, id: StaticObjectId) -> bool {
        let before = self.statics.len();
        self.statics.retain(|s| *s != id);
        self.statics.len() != before
    }
}

#[test]
fn test_backend_grounds_bodies_and_owns_statics() {
    let mut pipeline = PhysicsPipeline::with_backend(PhysicsConfig::default(), GroundEverything::default());
    let mut world = World::new();
    let body = static_box(&mut world, Vec3::new(50.0, 0.0, 0.0), Collision::default());

    tick(&mut pipeline, &mut world);
    assert!(world.get::<&Collision>(body).unwrap().is_on_floor);

    let id = pipeline.add_static_object(StaticMesh::default());
    assert!(pipeline.remove_static_object(id));
    assert!(!pipeline.remove_static_object(id));
}
