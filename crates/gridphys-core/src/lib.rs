//! Core types and definitions for the gridphys collision engine.
//!
//! This crate defines the vocabulary shared across the other crates:
//! components, geometry, collision masks, between-tick commands, and
//! constants. It has no dependency on the ECS or on any system.

pub mod commands;
pub mod components;
pub mod constants;
pub mod masks;
pub mod types;

pub use masks::CollisionMask;
pub use types::{Axis, Bounds, SimTime};
