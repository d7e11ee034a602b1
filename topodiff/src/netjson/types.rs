use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Node of a NetJSON NetworkGraph. The `id` is the primary address of the node, all other
/// addresses are kept in `local_addresses`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Node {
    id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    local_addresses: Vec<String>,
}

impl Node {
    /// Create a node with a single address
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            local_addresses: Vec::new(),
        }
    }

    /// Create a node with a primary address and additional local addresses
    pub fn with_local_addresses(id: impl Into<String>, local_addresses: Vec<String>) -> Self {
        Self {
            id: id.into(),
            local_addresses,
        }
    }

    /// Build a node out of an ordered address list. The first address becomes the id, the
    /// remainder the local addresses. Returns `None` if the list is empty.
    pub fn from_addresses(addresses: &[String]) -> Option<Self> {
        let (id, rest) = addresses.split_first()?;
        Some(Self::with_local_addresses(id.clone(), rest.to_vec()))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Addresses besides the primary one, in their original order
    pub fn local_addresses(&self) -> &[String] {
        &self.local_addresses
    }

    /// All addresses, primary first
    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.id.as_str()).chain(self.local_addresses.iter().map(String::as_str))
    }
}

/// Directed link between two nodes, identified by their primary addresses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    source: String,
    target: String,
    cost: f64,
}

impl Link {
    pub fn new(source: impl Into<String>, target: impl Into<String>, cost: f64) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            cost,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Identity of the link. Links are directed, `(a, b)` and `(b, a)` are different links.
    pub fn key(&self) -> (&str, &str) {
        (&self.source, &self.target)
    }
}

/// Metadata of a NetworkGraph, usually provided by the parser that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphMeta {
    /// Routing protocol, e.g. `OLSR`
    pub protocol: String,
    /// Version of the routing protocol implementation
    pub version: String,
    /// Name of the metric used as link cost, e.g. `ETX`
    pub metric: String,
}

impl GraphMeta {
    /// Create new metadata
    pub fn new(
        protocol: impl Into<String>,
        version: impl Into<String>,
        metric: impl Into<String>,
    ) -> Self {
        Self {
            protocol: protocol.into(),
            version: version.into(),
            metric: metric.into(),
        }
    }
}

/// Violations of the NetworkGraph invariants
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    /// A node has an empty id
    #[error("Node with an empty id")]
    EmptyNodeId,
    /// Two nodes share the same id
    #[error("Node {0} exists more than once")]
    DuplicateNode(String),
    /// A link references a node that is not part of the graph
    #[error("Link {from} -> {to} references unknown node {missing}")]
    MissingEndpoint {
        from: String,
        to: String,
        missing: String,
    },
    /// A link has a cost which is not a finite number
    #[error("Link {from} -> {to} has invalid cost {cost}")]
    InvalidCost {
        from: String,
        to: String,
        cost: f64,
    },
}
