//! # Topodiff
//!
//! Keeps track of network topologies described as NetJSON NetworkGraphs. A
//! [`Topology`](topology::Topology) stores the nodes and links currently known
//! about a network together with the URL its snapshot is fetched from and the
//! parser understanding that snapshot. The stored state can be rendered as a
//! NetJSON NetworkGraph ([`serializer`]), and compared against the latest
//! remote snapshot ([`fetcher`]) to obtain a [`Delta`](differ::Delta)
//! ([`differ`]).
//!
//! Computing a delta never changes the store. It is applied with
//! [`Topology::apply_delta`](topology::Topology::apply_delta), or fetched and
//! applied in one go with [`Topology::update`](topology::Topology::update), and
//! the result is persisted through a
//! [`TopologyRepository`](topology::TopologyRepository).

pub mod config;
pub mod differ;
pub mod example_networks;
pub mod fetcher;
pub mod netjson;
pub mod parsers;
pub mod serializer;
pub mod topology;

#[cfg(test)]
mod test;

pub use config::{ConfigError, Settings};
pub use differ::{diff, ChangedLink, Delta};
pub use fetcher::{FetchError, GraphFetcher, Transport, DEFAULT_TIMEOUT};
pub use netjson::{GraphError, GraphMeta, Link, NetworkGraph, Node};
pub use parsers::{ParseError, Parser, ParserRegistry, UnknownParserError};
pub use serializer::{SerializationError, SerializeMode};
pub use topology::{RepositoryError, Topology, TopologyConfig, TopologyError, TopologyRepository};

use thiserror::Error;

/// Topodiff Error type
#[derive(Error, Debug)]
pub enum Error {
    /// The stored topology could not be rendered as a NetworkGraph
    #[error("Serialization Error: {0}")]
    SerializationError(#[from] SerializationError),
    /// The remote snapshot could not be retrieved
    #[error("Fetch Error: {0}")]
    FetchError(#[from] FetchError),
    /// The remote snapshot could not be parsed
    #[error("Parse Error: {0}")]
    ParseError(#[from] ParseError),
    /// The format identifier does not resolve to a registered parser
    #[error("{0}")]
    UnknownParser(#[from] UnknownParserError),
    /// The topology store rejected an operation
    #[error("Topology Error: {0}")]
    TopologyError(#[from] TopologyError),
    /// The repository could not load or save a topology
    #[error("Repository Error: {0}")]
    RepositoryError(#[from] RepositoryError),
    /// The configuration is invalid
    #[error("Config Error: {0}")]
    ConfigError(#[from] ConfigError),
    /// Encoding a graph or delta as JSON failed
    #[error("JSON Error: {0}")]
    JsonError(#[from] serde_json::Error),
}
