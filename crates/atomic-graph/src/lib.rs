//! Dependency graph over a change set.
//!
//! Edges point from an imported file to the files importing it, so walking
//! forward from the roots visits files in the order they can be committed.

mod builder;
mod depth;
mod graph;
mod risk;
mod scc;

pub use builder::{NodeInput, build};
pub use graph::{DependencyGraph, DependencyNode};
pub use risk::{FAN_IN_THRESHOLD, classify_risk};
pub use scc::strongly_connected_components;
