//! Example topologies together with the snapshots they are compared against.

mod mesh;
pub use mesh::Mesh;

use crate::parsers::ParserRegistry;
use crate::topology::Topology;

/// Trait for generating example topologies
pub trait ExampleTopology {
    /// Url the latest snapshot is served at
    fn url() -> &'static str;

    /// Stored state of the topology
    fn topology(registry: &ParserRegistry) -> Topology;

    /// Payload of the latest snapshot. Variant 0 always matches the stored state.
    fn latest_payload(variant: usize) -> String;
}
