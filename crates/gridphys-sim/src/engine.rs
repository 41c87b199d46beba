//! Headless simulation engine.
//!
//! `SimulationEngine` owns the hecs world, the physics pipeline and a seeded
//! RNG. Map edits are queued and applied at the start of the next tick, so
//! the grid never changes while a tick is running.

use std::collections::VecDeque;

use glam::Vec3;
use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::warn;

use gridphys_core::commands::PhysicsCommand;
use gridphys_core::{Bounds, SimTime};

use crate::config::SimConfig;
use crate::pipeline::PhysicsPipeline;
use crate::systems;
use crate::systems::snapshot::PhysicsSnapshot;
use crate::world_setup;

pub struct SimulationEngine {
    world: World,
    pipeline: PhysicsPipeline,
    time: SimTime,
    rng: ChaCha8Rng,
    command_queue: VecDeque<PhysicsCommand>,
}

impl SimulationEngine {
    pub fn new(config: SimConfig) -> Self {
        Self {
            world: World::new(),
            pipeline: PhysicsPipeline::new(config.physics),
            time: SimTime::default(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            command_queue: VecDeque::new(),
        }
    }

    /// Queue a map edit for the next tick boundary.
    pub fn queue_command(&mut self, command: PhysicsCommand) {
        self.command_queue.push_back(command);
    }

    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = PhysicsCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the simulation by one tick and return the resulting snapshot.
    pub fn tick(&mut self) -> PhysicsSnapshot {
        self.process_commands();

        systems::gravity::run(&mut self.world);
        systems::spatial::sync_bounds(&mut self.world);
        let events = self.pipeline.tick(&mut self.world);
        systems::spatial::apply_movement(&mut self.world);
        systems::spatial::sync_bounds(&mut self.world);
        self.pipeline.cleanup(&mut self.world);

        self.time.advance(self.pipeline.config().dt());
        systems::snapshot::build_snapshot(&self.world, &self.time, &events)
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn pipeline(&self) -> &PhysicsPipeline {
        &self.pipeline
    }

    pub fn pipeline_mut(&mut self) -> &mut PhysicsPipeline {
        &mut self.pipeline
    }

    pub fn spawn_body(&mut self, position: Vec3, half_extents: Vec3) -> Entity {
        world_setup::spawn_body(&mut self.world, position, half_extents)
    }

    /// Spawn bodies at seeded random positions inside `region`.
    pub fn scatter_bodies(&mut self, count: usize, region: &Bounds) -> Vec<Entity> {
        world_setup::scatter_bodies(&mut self.world, &mut self.rng, count, region)
    }

    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            let kind = command.kind();
            if let Err(err) = self.pipeline.apply_command(command) {
                warn!(kind, %err, "rejected physics command");
            }
        }
    }
}
