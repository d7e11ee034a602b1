//! NetJSON NetworkGraph data model.
//!
//! A [`NetworkGraph`] is one snapshot of a topology: metadata, an ordered list of [`Node`]s
//! and an ordered list of directed [`Link`]s. Graphs are immutable values; a new snapshot
//! is always a new graph.

mod graph;
mod types;

pub use graph::NetworkGraph;
pub use types::{GraphError, GraphMeta, Link, Node};
