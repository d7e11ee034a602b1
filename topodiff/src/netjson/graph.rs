use super::types::{GraphError, GraphMeta, Link, Node};

use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum GraphType {
    NetworkGraph,
}

/// A single snapshot of a network topology in the NetJSON NetworkGraph format.
///
/// The graph cannot be changed once it is constructed. Serializing it produces the members
/// `type`, `protocol`, `version`, `metric`, `nodes` and `links`, in exactly this order. A known
/// `revision` is written between `version` and `metric`.
///
/// Deserialization validates the graph. Members unknown to this type (`router_id`, `label`,
/// ...) are ignored, and repeated node entries collapse into the first one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGraph")]
pub struct NetworkGraph {
    #[serde(rename = "type")]
    graph_type: GraphType,
    protocol: String,
    version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    revision: Option<String>,
    metric: String,
    nodes: Vec<Node>,
    links: Vec<Link>,
}

impl NetworkGraph {
    /// Create a new graph, checking that node ids are non-empty and unique, that every link
    /// connects two nodes of this graph and that all costs are finite.
    pub fn new(meta: GraphMeta, nodes: Vec<Node>, links: Vec<Link>) -> Result<Self, GraphError> {
        let mut ids = HashSet::with_capacity(nodes.len());
        for node in nodes.iter() {
            if node.id().is_empty() {
                return Err(GraphError::EmptyNodeId);
            }
            if !ids.insert(node.id()) {
                return Err(GraphError::DuplicateNode(node.id().to_string()));
            }
        }
        for link in links.iter() {
            for endpoint in [link.source(), link.target()] {
                if !ids.contains(endpoint) {
                    return Err(GraphError::MissingEndpoint {
                        from: link.source().to_string(),
                        to: link.target().to_string(),
                        missing: endpoint.to_string(),
                    });
                }
            }
            if !link.cost().is_finite() {
                return Err(GraphError::InvalidCost {
                    from: link.source().to_string(),
                    to: link.target().to_string(),
                    cost: link.cost(),
                });
            }
        }
        Ok(Self::from_parts(meta, nodes, links))
    }

    /// Create a graph without checking the node invariants. Only used to reproduce the output
    /// of the legacy serializer, which repeats nodes.
    pub(crate) fn from_parts(meta: GraphMeta, nodes: Vec<Node>, links: Vec<Link>) -> Self {
        Self {
            graph_type: GraphType::NetworkGraph,
            protocol: meta.protocol,
            version: meta.version,
            revision: None,
            metric: meta.metric,
            nodes,
            links,
        }
    }

    /// Attach the revision of the routing daemon
    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = Some(revision.into());
        self
    }

    /// Parse a graph from its JSON representation
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Encode the graph as JSON
    pub fn to_json(&self, pretty: bool) -> Result<String, serde_json::Error> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Revision of the routing daemon, if the snapshot states it
    pub fn revision(&self) -> Option<&str> {
        self.revision.as_deref()
    }

    pub fn metric(&self) -> &str {
        &self.metric
    }

    /// Protocol, version and metric of this graph
    pub fn meta(&self) -> GraphMeta {
        GraphMeta::new(self.protocol.clone(), self.version.clone(), self.metric.clone())
    }

    /// Nodes in their original order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Links in their original order
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id() == id)
    }

    /// Get the link from `source` to `target`
    pub fn link(&self, source: &str, target: &str) -> Option<&Link> {
        self.links.iter().find(|l| l.key() == (source, target))
    }
}

#[derive(Deserialize)]
struct RawGraph {
    #[serde(rename = "type")]
    graph_type: GraphType,
    protocol: String,
    version: String,
    #[serde(default)]
    revision: Option<String>,
    metric: String,
    #[serde(default)]
    nodes: Vec<Node>,
    #[serde(default)]
    links: Vec<Link>,
}

impl TryFrom<RawGraph> for NetworkGraph {
    type Error = GraphError;

    fn try_from(raw: RawGraph) -> Result<Self, Self::Error> {
        let GraphType::NetworkGraph = raw.graph_type;
        let mut seen = HashSet::new();
        let mut nodes = Vec::with_capacity(raw.nodes.len());
        for node in raw.nodes {
            if seen.contains(node.id()) {
                warn!("Ignoring repeated entry of node {}", node.id());
                continue;
            }
            seen.insert(node.id().to_string());
            nodes.push(node);
        }
        let meta = GraphMeta::new(raw.protocol, raw.version, raw.metric);
        let mut graph = NetworkGraph::new(meta, nodes, raw.links)?;
        graph.revision = raw.revision;
        Ok(graph)
    }
}
