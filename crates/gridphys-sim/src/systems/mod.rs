//! ECS systems run by the physics pipeline and the engine.
//!
//! Systems are free functions over `&mut World` (or `&World` when read-only).
//! They do not own state; all state lives in components or in the pipeline.

pub mod bounds_collider;
pub mod bounds_query;
pub mod collider_history;
pub mod gravity;
pub mod grid_collider;
pub mod grounding;
pub mod movement;
pub mod pulse;
pub mod snapshot;
pub mod spatial;
pub mod speed;
