//! Fixed-timestep collision pipeline for gridphys.
//!
//! Owns nothing global: the `PhysicsPipeline` runs its systems over a
//! caller-supplied hecs `World`, and `SimulationEngine` wraps a world, a
//! pipeline and a seeded RNG into a headless, deterministic simulation.

pub mod callbacks;
pub mod components;
pub mod config;
pub mod engine;
pub mod events;
pub mod pipeline;
pub mod resolver;
pub mod rigid_body;
pub mod systems;
pub mod world_setup;

pub use gridphys_core as core;
pub use gridphys_grid as grid;

pub use callbacks::CollisionCallbacks;
pub use config::{ConfigError, PhysicsConfig, SimConfig};
pub use engine::SimulationEngine;
pub use events::CollisionEvent;
pub use pipeline::PhysicsPipeline;
pub use resolver::{Collider, CollisionResolver, Filter};

#[cfg(test)]
mod tests;
