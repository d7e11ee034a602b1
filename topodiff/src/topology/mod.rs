//! The topology store: identity, configuration and currently known state of one network.

mod record;
mod repository;

pub use record::{LinkRecord, TopologyRecord};
pub use repository::{JsonDirRepository, MemoryRepository, RepositoryError, TopologyRepository};

use crate::differ::{self, Delta};
use crate::fetcher::{GraphFetcher, Transport};
use crate::netjson::{GraphMeta, NetworkGraph};
use crate::parsers::{Parser, ParserRegistry, UnknownParserError};
use crate::serializer::{self, LinkRef, SerializeMode};
use crate::Error;

use log::{debug, info};
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Identifier of a node inside the store
pub type NodeId = NodeIndex;
/// Identifier of a link inside the store
pub type LinkId = EdgeIndex;

/// Errors raised by the topology store
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TopologyError {
    /// A node needs at least one address
    #[error("Node without addresses")]
    NoAddresses,
    /// Addresses must not be empty strings
    #[error("Empty address")]
    EmptyAddress,
    /// The address already belongs to another node
    #[error("Address {0} already belongs to another node")]
    AddressInUse(String),
    /// There is no node with this address
    #[error("No node with address {0}")]
    UnknownNode(String),
    /// The store has no node with this id
    #[error("Node {0:?} does not exist")]
    NodeDoesNotExist(NodeId),
    /// There is no link between the two addresses
    #[error("No link {0} -> {1}")]
    UnknownLink(String, String),
    /// A link between the two nodes already exists
    #[error("Link {0:?} -> {1:?} already exists")]
    DuplicateLink(NodeId, NodeId),
    /// The cost is not a finite number
    #[error("Invalid cost {0}")]
    InvalidCost(f64),
    /// A record references a node it does not contain
    #[error("Record references node {0}, but contains only {1} nodes")]
    InvalidRecord(usize, usize),
}

/// User supplied configuration of a topology
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyConfig {
    /// Human readable name
    pub label: String,
    /// Format identifier of the parser
    pub parser: String,
    /// Where the topology data is fetched from
    pub url: String,
}

impl TopologyConfig {
    /// Create a new configuration
    pub fn new(
        label: impl Into<String>,
        parser: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            parser: parser.into(),
            url: url.into(),
        }
    }
}

/// A node as kept by the store: an ordered list of addresses, the first one is the primary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredNode {
    addresses: Vec<String>,
}

impl StoredNode {
    /// All addresses, primary first
    pub fn addresses(&self) -> &[String] {
        &self.addresses
    }

    pub fn primary(&self) -> &str {
        &self.addresses[0]
    }
}

/// A link as kept by the store
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StoredLink {
    /// Cost of the link
    pub cost: f64,
}

type StoreGraph = StableDiGraph<StoredNode, StoredLink>;

/// A network topology: where its snapshot comes from, which parser reads it, and the nodes
/// and links currently known about it.
///
/// The parser is resolved when the topology is created, so an unknown format identifier is
/// reported right away.
#[derive(Debug, Clone)]
pub struct Topology {
    id: Uuid,
    label: String,
    parser_id: String,
    parser: Arc<dyn Parser>,
    url: String,
    protocol: String,
    version: String,
    revision: String,
    metric: String,
    graph: StoreGraph,
}

impl Topology {
    /// Create a new, empty topology. Protocol, version and metric are taken from the parser.
    pub fn new(
        config: TopologyConfig,
        registry: &ParserRegistry,
    ) -> Result<Self, UnknownParserError> {
        let parser = registry.get(&config.parser)?;
        let id = Uuid::new_v4();
        info!("Created topology {} ({}) using parser {}", config.label, id, config.parser);
        Ok(Self {
            id,
            label: config.label,
            parser_id: config.parser,
            protocol: parser.protocol().to_string(),
            version: parser.version().to_string(),
            revision: String::new(),
            metric: parser.metric().to_string(),
            parser,
            url: config.url,
            graph: StoreGraph::default(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn parser_id(&self) -> &str {
        &self.parser_id
    }

    pub fn parser(&self) -> &dyn Parser {
        self.parser.as_ref()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Routing protocol, filled from the parser
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Revision of the routing daemon, empty if unknown. Filled by [`Topology::update`] when
    /// the snapshot states it.
    pub fn revision(&self) -> &str {
        &self.revision
    }

    pub fn set_revision(&mut self, revision: impl Into<String>) {
        self.revision = revision.into();
    }

    pub fn metric(&self) -> &str {
        &self.metric
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn link_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node(&self, id: NodeId) -> Option<&StoredNode> {
        self.graph.node_weight(id)
    }

    /// Ids of all stored nodes
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.node_indices()
    }

    /// Find the node owning `address`, whether primary or local
    pub fn find_node(&self, address: &str) -> Option<NodeId> {
        find_node(&self.graph, address)
    }

    /// Cost of the link from `source` to `target`
    pub fn link_cost(&self, source: NodeId, target: NodeId) -> Option<f64> {
        let edge = self.graph.find_edge(source, target)?;
        self.graph.edge_weight(edge).map(|l| l.cost)
    }

    /// Add a node with the ordered list of `addresses`
    pub fn add_node(&mut self, addresses: Vec<String>) -> Result<NodeId, TopologyError> {
        add_node(&mut self.graph, addresses)
    }

    /// Add a link from `source` to `target`
    pub fn add_link(
        &mut self,
        source: NodeId,
        target: NodeId,
        cost: f64,
    ) -> Result<LinkId, TopologyError> {
        add_link(&mut self.graph, source, target, cost)
    }

    /// Render the stored links as a NetworkGraph, using the metadata of the parser.
    pub fn json(&self, mode: SerializeMode) -> Result<NetworkGraph, Error> {
        let links = self.graph.edge_indices().filter_map(|e| {
            let (source, target) = self.graph.edge_endpoints(e)?;
            Some(LinkRef {
                source,
                target,
                cost: self.graph[e].cost,
            })
        });
        let graph = serializer::serialize(
            &self.parser.meta(),
            links,
            |id| self.graph.node_weight(*id).map(StoredNode::addresses),
            mode,
        )?;
        Ok(graph)
    }

    /// Render the stored links as NetJSON text
    pub fn json_string(&self, mode: SerializeMode, pretty: bool) -> Result<String, Error> {
        Ok(self.json(mode)?.to_json(pretty)?)
    }

    /// Fetch and parse the latest snapshot from the url of this topology
    pub fn latest<T: Transport>(
        &self,
        fetcher: &GraphFetcher<T>,
        timeout: Duration,
    ) -> Result<NetworkGraph, Error> {
        fetcher.fetch_with(&self.url, self.parser.as_ref(), timeout)
    }

    /// Compare the stored state with the latest snapshot
    pub fn diff<T: Transport>(
        &self,
        fetcher: &GraphFetcher<T>,
        mode: SerializeMode,
        timeout: Duration,
    ) -> Result<Delta, Error> {
        let latest = self.latest(fetcher, timeout)?;
        self.diff_against(&latest, mode)
    }

    fn diff_against(&self, latest: &NetworkGraph, mode: SerializeMode) -> Result<Delta, Error> {
        let current = self.json(mode)?;
        let delta = differ::diff(&current, latest);
        debug!("Topology {}: {} differences", self.label, delta.len());
        Ok(delta)
    }

    /// Fetch the latest snapshot and bring the stored state up to date with it. The revision
    /// is taken over from the snapshot if it states one. Returns the applied delta.
    pub fn update<T: Transport>(
        &mut self,
        fetcher: &GraphFetcher<T>,
        timeout: Duration,
    ) -> Result<Delta, Error> {
        let latest = self.latest(fetcher, timeout)?;
        let delta = self.diff_against(&latest, SerializeMode::Corrected)?;
        self.apply_delta(&delta)?;
        if let Some(revision) = latest.revision() {
            self.revision = revision.to_string();
        }
        Ok(delta)
    }

    /// Apply a delta computed against the stored state. Either the whole delta is applied, or
    /// nothing is changed.
    ///
    /// Links are expected to point from source to target, as produced with
    /// [`SerializeMode::Corrected`].
    pub fn apply_delta(&mut self, delta: &Delta) -> Result<(), TopologyError> {
        let mut graph = self.graph.clone();

        for link in delta.removed_links.iter() {
            let edge = find_link(&graph, link.source(), link.target())?;
            graph.remove_edge(edge);
        }
        for change in delta.changed_links.iter() {
            let edge = find_link(&graph, &change.source, &change.target)?;
            graph[edge].cost = change.new_cost;
        }
        for node in delta.removed_nodes.iter() {
            let idx = find_node(&graph, node.id())
                .ok_or_else(|| TopologyError::UnknownNode(node.id().to_string()))?;
            graph.remove_node(idx);
        }
        for node in delta.added_nodes.iter() {
            let addresses: Vec<String> = node.addresses().map(String::from).collect();
            match find_node(&graph, node.id()) {
                // already stored without any link
                Some(idx) => set_addresses(&mut graph, idx, addresses)?,
                None => {
                    add_node(&mut graph, addresses)?;
                }
            }
        }
        for link in delta.added_links.iter() {
            let source = find_or_add_node(&mut graph, link.source())?;
            let target = find_or_add_node(&mut graph, link.target())?;
            match graph.find_edge(source, target) {
                Some(edge) => graph[edge].cost = link.cost(),
                None => {
                    add_link(&mut graph, source, target, link.cost())?;
                }
            }
        }

        info!(
            "Topology {}: applied {} differences ({} nodes, {} links)",
            self.label,
            delta.len(),
            graph.node_count(),
            graph.edge_count()
        );
        self.graph = graph;
        Ok(())
    }

    /// Persistable form of this topology
    pub fn to_record(&self) -> TopologyRecord {
        let indices: Vec<NodeId> = self.graph.node_indices().collect();
        let position: HashMap<NodeId, usize> =
            indices.iter().enumerate().map(|(pos, idx)| (*idx, pos)).collect();
        TopologyRecord {
            id: self.id,
            label: self.label.clone(),
            parser: self.parser_id.clone(),
            url: self.url.clone(),
            protocol: self.protocol.clone(),
            version: self.version.clone(),
            revision: self.revision.clone(),
            metric: self.metric.clone(),
            nodes: indices.iter().map(|i| self.graph[*i].addresses.clone()).collect(),
            links: self
                .graph
                .edge_indices()
                .filter_map(|e| {
                    let (source, target) = self.graph.edge_endpoints(e)?;
                    Some(LinkRecord {
                        source: position[&source],
                        target: position[&target],
                        cost: self.graph[e].cost,
                    })
                })
                .collect(),
        }
    }

    /// Restore a topology from its record, resolving the parser.
    pub fn from_record(record: TopologyRecord, registry: &ParserRegistry) -> Result<Self, Error> {
        let parser = registry.get(&record.parser)?;
        let mut graph = StoreGraph::default();
        let mut indices = Vec::with_capacity(record.nodes.len());
        for addresses in record.nodes {
            indices.push(add_node(&mut graph, addresses)?);
        }
        let node = |i: usize| {
            indices.get(i).copied().ok_or(TopologyError::InvalidRecord(i, indices.len()))
        };
        for link in record.links.iter() {
            add_link(&mut graph, node(link.source)?, node(link.target)?, link.cost)?;
        }
        Ok(Self {
            id: record.id,
            label: record.label,
            parser_id: record.parser,
            parser,
            url: record.url,
            protocol: record.protocol,
            version: record.version,
            revision: record.revision,
            metric: record.metric,
            graph,
        })
    }

    /// Metadata of the resolved parser
    pub fn meta(&self) -> GraphMeta {
        self.parser.meta()
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

fn find_node(graph: &StoreGraph, address: &str) -> Option<NodeId> {
    graph.node_indices().find(|i| graph[*i].addresses.iter().any(|a| a == address))
}

fn find_or_add_node(graph: &mut StoreGraph, address: &str) -> Result<NodeId, TopologyError> {
    match find_node(graph, address) {
        Some(idx) => Ok(idx),
        None => add_node(graph, vec![address.to_string()]),
    }
}

fn find_link(graph: &StoreGraph, source: &str, target: &str) -> Result<LinkId, TopologyError> {
    let unknown = || TopologyError::UnknownLink(source.to_string(), target.to_string());
    let source = find_node(graph, source).ok_or_else(unknown)?;
    let target = find_node(graph, target).ok_or_else(unknown)?;
    graph.find_edge(source, target).ok_or_else(unknown)
}

/// Check that `addresses` may be assigned to a node. Addresses owned by `owner` are allowed.
fn check_addresses(
    graph: &StoreGraph,
    addresses: &[String],
    owner: Option<NodeId>,
) -> Result<(), TopologyError> {
    if addresses.is_empty() {
        return Err(TopologyError::NoAddresses);
    }
    for address in addresses.iter() {
        if address.is_empty() {
            return Err(TopologyError::EmptyAddress);
        }
        match find_node(graph, address) {
            Some(idx) if Some(idx) != owner => {
                return Err(TopologyError::AddressInUse(address.clone()))
            }
            _ => {}
        }
    }
    Ok(())
}

fn add_node(graph: &mut StoreGraph, addresses: Vec<String>) -> Result<NodeId, TopologyError> {
    check_addresses(graph, &addresses, None)?;
    Ok(graph.add_node(StoredNode { addresses }))
}

fn set_addresses(
    graph: &mut StoreGraph,
    idx: NodeId,
    addresses: Vec<String>,
) -> Result<(), TopologyError> {
    check_addresses(graph, &addresses, Some(idx))?;
    graph[idx].addresses = addresses;
    Ok(())
}

fn add_link(
    graph: &mut StoreGraph,
    source: NodeId,
    target: NodeId,
    cost: f64,
) -> Result<LinkId, TopologyError> {
    for idx in [source, target] {
        if !graph.contains_node(idx) {
            return Err(TopologyError::NodeDoesNotExist(idx));
        }
    }
    if !cost.is_finite() {
        return Err(TopologyError::InvalidCost(cost));
    }
    if graph.find_edge(source, target).is_some() {
        return Err(TopologyError::DuplicateLink(source, target));
    }
    Ok(graph.add_edge(source, target, StoredLink { cost }))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fetcher::{MemoryTransport, DEFAULT_TIMEOUT};
    use crate::netjson::{Link, Node};

    fn addrs(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn topology() -> Topology {
        let config = TopologyConfig::new("ninux", "olsr", "http://127.0.0.1:9090");
        Topology::new(config, &ParserRegistry::with_builtins()).unwrap()
    }

    #[test]
    fn test_new() {
        let t = topology();
        assert_eq!(t.to_string(), "ninux");
        assert_eq!(t.protocol(), "OLSR");
        assert_eq!(t.version(), "0.8");
        assert_eq!(t.metric(), "ETX");
        assert_eq!(t.revision(), "");
        assert_eq!(t.node_count(), 0);
    }

    #[test]
    fn test_unknown_parser() {
        let config = TopologyConfig::new("ninux", "netdiff.OlsrParser", "http://127.0.0.1:9090");
        assert_eq!(
            Topology::new(config, &ParserRegistry::with_builtins()).unwrap_err(),
            UnknownParserError("netdiff.OlsrParser".to_string())
        );
    }

    #[test]
    fn test_add_node() {
        let mut t = topology();
        let a = t.add_node(addrs(&["10.0.0.1", "172.16.0.1"])).unwrap();
        assert_eq!(t.find_node("172.16.0.1"), Some(a));
        assert_eq!(t.node(a).unwrap().primary(), "10.0.0.1");
        assert_eq!(t.add_node(vec![]), Err(TopologyError::NoAddresses));
        assert_eq!(t.add_node(addrs(&[""])), Err(TopologyError::EmptyAddress));
        assert_eq!(
            t.add_node(addrs(&["10.0.0.2", "172.16.0.1"])),
            Err(TopologyError::AddressInUse("172.16.0.1".to_string()))
        );
        assert_eq!(t.node_count(), 1);
    }

    #[test]
    fn test_add_link() {
        let mut t = topology();
        let a = t.add_node(addrs(&["10.0.0.1"])).unwrap();
        let b = t.add_node(addrs(&["10.0.0.2"])).unwrap();
        t.add_link(a, b, 1.0).unwrap();
        t.add_link(b, a, 2.0).unwrap();
        assert_eq!(t.add_link(a, b, 3.0), Err(TopologyError::DuplicateLink(a, b)));
        assert!(matches!(t.add_link(a, a, f64::NAN), Err(TopologyError::InvalidCost(_))));
        assert_eq!(t.link_cost(b, a), Some(2.0));
    }

    #[test]
    fn test_json() {
        let mut t = topology();
        let a = t.add_node(addrs(&["10.0.0.1", "172.16.0.1"])).unwrap();
        let b = t.add_node(addrs(&["10.0.0.2"])).unwrap();
        t.add_node(addrs(&["10.0.0.3"])).unwrap();
        t.add_link(a, b, 1.0).unwrap();

        let graph = t.json(SerializeMode::Corrected).unwrap();
        assert_eq!(
            graph.nodes(),
            &[
                Node::with_local_addresses("10.0.0.1", addrs(&["172.16.0.1"])),
                Node::new("10.0.0.2")
            ][..]
        );
        assert_eq!(graph.links(), &[Link::new("10.0.0.1", "10.0.0.2", 1.0)][..]);
        assert_eq!(graph.meta(), GraphMeta::new("OLSR", "0.8", "ETX"));

        let graph = t.json(SerializeMode::Faithful).unwrap();
        assert_eq!(graph.links(), &[Link::new("10.0.0.1", "10.0.0.1", 1.0)][..]);

        assert_eq!(
            t.json_string(SerializeMode::Corrected, false).unwrap(),
            "{\"type\":\"NetworkGraph\",\"protocol\":\"OLSR\",\"version\":\"0.8\",\
             \"metric\":\"ETX\",\"nodes\":[{\"id\":\"10.0.0.1\",\
             \"local_addresses\":[\"172.16.0.1\"]},{\"id\":\"10.0.0.2\"}],\
             \"links\":[{\"source\":\"10.0.0.1\",\"target\":\"10.0.0.2\",\"cost\":1.0}]}"
        );
    }

    #[test]
    fn test_apply_delta_is_atomic() {
        let mut t = topology();
        let a = t.add_node(addrs(&["10.0.0.1"])).unwrap();
        let b = t.add_node(addrs(&["10.0.0.2"])).unwrap();
        t.add_link(a, b, 1.0).unwrap();
        let delta = Delta {
            added_nodes: vec![Node::new("10.0.0.3")],
            removed_links: vec![Link::new("10.0.0.2", "10.0.0.1", 1.0)],
            ..Delta::default()
        };
        assert_eq!(
            t.apply_delta(&delta),
            Err(TopologyError::UnknownLink("10.0.0.2".to_string(), "10.0.0.1".to_string()))
        );
        assert_eq!(t.node_count(), 2);
        assert_eq!(t.link_count(), 1);
    }

    #[test]
    fn test_apply_delta_keeps_addresses_unique() {
        let mut t = topology();
        let b = t.add_node(addrs(&["10.0.0.2"])).unwrap();
        let c = t.add_node(addrs(&["10.0.0.3"])).unwrap();
        let delta = Delta {
            added_nodes: vec![Node::with_local_addresses("10.0.0.3", addrs(&["10.0.0.2"]))],
            ..Delta::default()
        };
        assert_eq!(
            t.apply_delta(&delta),
            Err(TopologyError::AddressInUse("10.0.0.2".to_string()))
        );
        assert_eq!(t.node(c).unwrap().addresses(), &addrs(&["10.0.0.3"])[..]);
        assert_eq!(t.find_node("10.0.0.2"), Some(b));

        // a node may keep its own addresses
        let delta = Delta {
            added_nodes: vec![Node::with_local_addresses("10.0.0.3", addrs(&["172.16.0.3"]))],
            ..Delta::default()
        };
        t.apply_delta(&delta).unwrap();
        assert_eq!(t.find_node("172.16.0.3"), Some(c));
    }

    fn serving(payload: &str) -> GraphFetcher<MemoryTransport> {
        let mut transport = MemoryTransport::new();
        transport.insert("http://127.0.0.1:9090", payload);
        GraphFetcher::new(transport, ParserRegistry::with_builtins())
    }

    #[test]
    fn test_update_ignores_nodes_without_links() {
        let registry = ParserRegistry::with_builtins();
        let config = TopologyConfig::new("ninux", "netjson", "http://127.0.0.1:9090");
        let mut t = Topology::new(config, &registry).unwrap();
        let a = t.add_node(addrs(&["A"])).unwrap();
        let b = t.add_node(addrs(&["B"])).unwrap();
        t.add_link(a, b, 1.0).unwrap();

        let fetcher = serving(
            r#"{"type": "NetworkGraph", "protocol": "OLSR", "version": "0.8",
                "revision": "0.6.6.2", "metric": "ETX",
                "nodes": [{"id": "A"}, {"id": "B"}, {"id": "C"}],
                "links": [{"source": "A", "target": "B", "cost": 1.0}]}"#,
        );
        let delta = t.update(&fetcher, DEFAULT_TIMEOUT).unwrap();
        assert!(delta.is_empty(), "unexpected delta: {:?}", delta);
        assert_eq!(t.node_count(), 2);
        assert_eq!(t.revision(), "0.6.6.2");
        assert!(t.diff(&fetcher, SerializeMode::Corrected, DEFAULT_TIMEOUT).unwrap().is_empty());
    }

    #[test]
    fn test_update() {
        let mut t = topology();
        t.set_revision("0.6.6.2");
        let fetcher = serving(
            r#"{"topology": [{"lastHopIP": "A", "destinationIP": "B", "tcEdgeCost": 1024}]}"#,
        );
        let delta = t.update(&fetcher, DEFAULT_TIMEOUT).unwrap();
        assert_eq!(delta.added_links, vec![Link::new("A", "B", 1.0)]);
        assert_eq!(t.link_count(), 1);
        // the snapshot does not state a revision
        assert_eq!(t.revision(), "0.6.6.2");
        assert!(t.update(&fetcher, DEFAULT_TIMEOUT).unwrap().is_empty());
    }

    #[test]
    fn test_record() {
        let mut t = topology();
        t.set_revision("0.6.6.2");
        let a = t.add_node(addrs(&["10.0.0.1", "172.16.0.1"])).unwrap();
        let b = t.add_node(addrs(&["10.0.0.2"])).unwrap();
        t.add_link(a, b, 1.0).unwrap();
        t.add_link(b, a, 1.5).unwrap();

        let restored =
            Topology::from_record(t.to_record(), &ParserRegistry::with_builtins()).unwrap();
        assert_eq!(restored.id(), t.id());
        assert_eq!(restored.revision(), "0.6.6.2");
        assert_eq!(restored.to_record(), t.to_record());
        assert_eq!(
            restored.json(SerializeMode::Corrected).unwrap(),
            t.json(SerializeMode::Corrected).unwrap()
        );
    }

    #[test]
    fn test_invalid_record() {
        let mut record = topology().to_record();
        record.nodes = vec![addrs(&["10.0.0.1"])];
        record.links = vec![LinkRecord {
            source: 0,
            target: 1,
            cost: 1.0,
        }];
        assert!(matches!(
            Topology::from_record(record, &ParserRegistry::with_builtins()),
            Err(Error::TopologyError(TopologyError::InvalidRecord(1, 1)))
        ));
    }
}
