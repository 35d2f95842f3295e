//! Application layer - Orchestration around the sensor-tag core
//!
//! One actor per tag serializes every mutation for that device; distinct
//! tags run independently.

pub mod tag;

pub use tag::{LightMode, TagActor, TagCommand, TagHandle, TagManager};
