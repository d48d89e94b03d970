//! Registry module — per-group runtime state and the shared registry map.

pub mod map;
pub mod state;

pub use map::{GroupRegistry, GroupSnapshot, ReapCandidate};
pub use state::{container_name_for, GroupState};
