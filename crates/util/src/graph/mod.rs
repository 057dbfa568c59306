//! Convenient graph manipulation.
//! We don't use petgraph because we need parallel edges
//! and a cycle search that reports the cycle it found.

#[expect(clippy::module_inception)]
pub mod graph;

pub mod finalized;
pub mod util;
