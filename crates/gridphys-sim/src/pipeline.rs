//! The physics orchestrator.
//!
//! `PhysicsPipeline` owns the tile grid, the resolver, the callback lists and
//! the rigid-body backend, and runs the collision systems over a
//! caller-owned world in a fixed order each tick. It never touches
//! transforms; the caller applies the resolved `Movement` afterwards and
//! then calls `cleanup`.

use std::cell::RefCell;
use std::rc::Rc;

use glam::{IVec3, Vec3};
use hecs::{Entity, World};
use tracing::{info, trace, warn};

use gridphys_core::commands::PhysicsCommand;
use gridphys_core::{Bounds, CollisionMask};
use gridphys_grid::{GridError, TileGrid};

use crate::callbacks::CollisionCallbacks;
use crate::config::PhysicsConfig;
use crate::events::CollisionEvent;
use crate::resolver::{CollisionResolver, Filter};
use crate::rigid_body::{NullRigidBody, RigidBodyBackend, StaticMesh, StaticObjectId};
use crate::systems::{self, grounding};

pub struct PhysicsPipeline {
    config: PhysicsConfig,
    grid: TileGrid,
    resolver: CollisionResolver,
    grid_callbacks: CollisionCallbacks,
    bounds_callbacks: CollisionCallbacks,
    backend: Box<dyn RigidBodyBackend>,
}

impl Default for PhysicsPipeline {
    fn default() -> Self {
        Self::new(PhysicsConfig::default())
    }
}

impl PhysicsPipeline {
    pub fn new(config: PhysicsConfig) -> Self {
        Self::with_backend(config, NullRigidBody::default())
    }

    pub fn with_backend<B: RigidBodyBackend + 'static>(config: PhysicsConfig, backend: B) -> Self {
        let mut grid = TileGrid::default();
        if let Err(err) = grid.set_scale(config.tile_scale) {
            warn!(%err, "ignoring configured tile scale");
        }

        // History sees every bounds contact before user subscribers do.
        let mut bounds_callbacks = CollisionCallbacks::new();
        bounds_callbacks.subscribe(systems::collider_history::observe);

        Self {
            config,
            grid,
            resolver: CollisionResolver::new(),
            grid_callbacks: CollisionCallbacks::new(),
            bounds_callbacks,
            backend: Box::new(backend),
        }
    }

    /// Run one fixed step. Returns every event raised, in dispatch order.
    pub fn tick(&mut self, world: &mut World) -> Vec<CollisionEvent> {
        let dt = self.config.dt();
        let mut events = Vec::new();

        // 1. Per-source ground flags for newly seen collision entities
        grounding::attach_ground_state(world);
        // 2. Velocity integration
        systems::speed::run(world, dt);
        // 3. Requested displacement
        systems::movement::run(world, dt);
        grounding::snapshot_pre_physics(world);
        // 4. Collidability toggles
        systems::pulse::run(world, dt);
        // 5. External rigid bodies
        let grounded = self.backend.step(world, dt);
        grounding::mark_rigid_body(world, &grounded);
        // 6. Tile grid
        systems::grid_collider::run(
            world,
            &self.grid,
            &self.resolver,
            &mut self.grid_callbacks,
            &mut events,
        );
        // 7. Body pairs (history observes through its subscription)
        systems::bounds_collider::run(
            world,
            &self.grid,
            &self.resolver,
            &mut self.bounds_callbacks,
            &mut events,
        );
        // 8. History merge
        systems::collider_history::run(world, dt, &mut events);
        // 9. Aggregate grounded state
        grounding::aggregate(world);

        trace!(events = events.len(), "physics tick");
        events
    }

    /// Clear per-tick state once the caller has applied the resolved movement.
    pub fn cleanup(&mut self, world: &mut World) {
        grounding::cleanup(world);
    }

    /// Apply a queued map edit. Only call between ticks.
    pub fn apply_command(&mut self, command: PhysicsCommand) -> Result<(), GridError> {
        match command {
            PhysicsCommand::SetTiles { dims, tiles } => self.set_tiles(dims, tiles),
            PhysicsCommand::SetTile { x, y, z, tile } => self.grid.set_tile(IVec3::new(x, y, z), tile),
            PhysicsCommand::SetTileFriction { friction } => {
                self.set_tile_friction(friction);
                Ok(())
            }
            PhysicsCommand::SetTileCollisionGroups { groups } => {
                self.set_tile_collision_groups(groups);
                Ok(())
            }
            PhysicsCommand::SetTileScale { scale } => self.set_tile_scale(scale),
        }
    }

    pub fn set_tiles(&mut self, dims: [usize; 3], tiles: Vec<u8>) -> Result<(), GridError> {
        self.grid.set_tiles(dims, tiles)?;
        info!(?dims, "tile grid loaded");
        Ok(())
    }

    /// Nested `[x][y][z]` form, as produced by map loaders.
    pub fn set_tiles_nested(&mut self, tiles: &[Vec<Vec<u8>>]) -> Result<(), GridError> {
        self.grid.set_tiles_nested(tiles)?;
        info!(dims = ?self.grid.dims(), "tile grid loaded");
        Ok(())
    }

    pub fn set_tile(&mut self, index: IVec3, tile: u8) -> Result<(), GridError> {
        self.grid.set_tile(index, tile)
    }

    pub fn set_tile_friction(&mut self, friction: Vec<f32>) {
        self.grid.set_friction(friction);
    }

    pub fn set_tile_collision_groups(&mut self, groups: Vec<CollisionMask>) {
        self.grid.set_collision_groups(groups);
    }

    pub fn set_tile_scale(&mut self, scale: f32) -> Result<(), GridError> {
        self.grid.set_scale(scale)
    }

    pub fn add_static_object(&mut self, mesh: StaticMesh) -> StaticObjectId {
        self.backend.add_static_object(mesh)
    }

    pub fn remove_static_object(&mut self, id: StaticObjectId) -> bool {
        self.backend.remove_static_object(id)
    }

    /// Subscribe one handler to both tile and body contacts.
    pub fn add_collision_callbacks<F>(&mut self, callback: F)
    where
        F: FnMut(&mut World, &CollisionEvent) + 'static,
    {
        let shared = Rc::new(RefCell::new(callback));

        let on_tile = Rc::clone(&shared);
        self.grid_callbacks.subscribe(move |world, event| {
            let mut callback = on_tile.borrow_mut();
            (*callback)(world, event);
        });
        self.bounds_callbacks.subscribe(move |world, event| {
            let mut callback = shared.borrow_mut();
            (*callback)(world, event);
        });
    }

    pub fn add_filter<F: Filter + 'static>(&mut self, filter: F) {
        self.resolver.add_filter(filter);
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn resolver(&self) -> &CollisionResolver {
        &self.resolver
    }

    pub fn tile_at_index(&self, index: IVec3) -> Result<u8, GridError> {
        self.grid.tile_at_index(index)
    }

    pub fn position_from_grid(&self, index: IVec3) -> Vec3 {
        self.grid.position_from_grid(index)
    }

    /// Where a placement tool aiming along the ray would put a new tile.
    pub fn closest_empty_cell_along_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
    ) -> Option<IVec3> {
        self.grid
            .closest_empty_cell_along_ray(origin, direction, max_distance, self.config.ray_step)
    }

    pub fn entities_in_bounds(
        &self,
        world: &World,
        area: &Bounds,
        targets: CollisionMask,
    ) -> Vec<Entity> {
        systems::bounds_query::entities_in_bounds(world, &self.resolver, area, targets)
    }

    pub fn closest_intersect(
        &self,
        world: &World,
        origin: Vec3,
        direction: Vec3,
        exclude: Option<Entity>,
    ) -> Option<(Entity, f32)> {
        systems::bounds_query::closest_intersect(world, &self.resolver, origin, direction, exclude)
    }
}
