//! Rendering of stored topology data as a NetJSON NetworkGraph.
//!
//! Nodes are discovered through the links only: every link contributes its two endpoints, a
//! node without any link never shows up in the output.

use crate::netjson::{GraphError, GraphMeta, Link, NetworkGraph, Node};

use log::trace;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Debug;
use thiserror::Error;

/// Selects how links and nodes are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SerializeMode {
    /// Links point from their source to their target node, and every node appears once, in
    /// the order it is first seen while iterating over the links.
    Corrected,
    /// Output compatible with the legacy serializer: both endpoints are appended for every
    /// link without removing repetitions, and the `target` of every link is set to the id of
    /// its *source* node.
    Faithful,
}

impl Default for SerializeMode {
    fn default() -> Self {
        SerializeMode::Corrected
    }
}

/// Errors while rendering a graph
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SerializationError {
    /// A link references a node that cannot be resolved
    #[error("Node {0} referenced by a link cannot be resolved")]
    UnresolvedNode(String),
    /// A node has no address that could serve as its id
    #[error("Node {0} has no addresses")]
    EmptyNode(String),
    /// The rendered graph violates the NetworkGraph invariants
    #[error("Rendered graph is invalid: {0}")]
    InvalidGraph(#[from] GraphError),
}

/// A stored link, referring to its endpoints with the key used by the node lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkRef<K> {
    /// Key of the source node
    pub source: K,
    /// Key of the target node
    pub target: K,
    /// Cost of the link
    pub cost: f64,
}

/// Render `links` as a NetworkGraph with the metadata `meta`. The `lookup` resolves the key
/// of a node to its ordered list of addresses.
pub fn serialize<'a, K, L, F>(
    meta: &GraphMeta,
    links: L,
    lookup: F,
    mode: SerializeMode,
) -> Result<NetworkGraph, SerializationError>
where
    K: Debug,
    L: IntoIterator<Item = LinkRef<K>>,
    F: Fn(&K) -> Option<&'a [String]>,
{
    let mut nodes: Vec<Node> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut netjson_links: Vec<Link> = Vec::new();

    for link in links {
        let source = resolve(&link.source, &lookup)?;
        let target = resolve(&link.target, &lookup)?;
        trace!("link {} -> {} (cost {})", source.id(), target.id(), link.cost);

        match mode {
            SerializeMode::Corrected => {
                netjson_links.push(Link::new(source.id(), target.id(), link.cost));
                for node in [source, target] {
                    if seen.insert(node.id().to_string()) {
                        nodes.push(node);
                    }
                }
            }
            SerializeMode::Faithful => {
                netjson_links.push(Link::new(source.id(), source.id(), link.cost));
                nodes.push(source);
                nodes.push(target);
            }
        }
    }

    match mode {
        SerializeMode::Corrected => Ok(NetworkGraph::new(meta.clone(), nodes, netjson_links)?),
        SerializeMode::Faithful => Ok(NetworkGraph::from_parts(meta.clone(), nodes, netjson_links)),
    }
}

fn resolve<'a, K, F>(key: &K, lookup: &F) -> Result<Node, SerializationError>
where
    K: Debug,
    F: Fn(&K) -> Option<&'a [String]>,
{
    let addresses =
        lookup(key).ok_or_else(|| SerializationError::UnresolvedNode(format!("{:?}", key)))?;
    Node::from_addresses(addresses)
        .ok_or_else(|| SerializationError::EmptyNode(format!("{:?}", key)))
}

#[cfg(test)]
mod test {
    use super::*;
    use maplit::hashmap;
    use std::collections::HashMap;

    fn addrs(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn meta() -> GraphMeta {
        GraphMeta::new("OLSR", "0.8", "ETX")
    }

    fn lookup_table() -> HashMap<u32, Vec<String>> {
        hashmap! {
            1 => addrs(&["10.0.0.1", "172.16.0.1", "192.168.0.1"]),
            2 => addrs(&["10.0.0.2"]),
            3 => addrs(&["10.0.0.3"]),
        }
    }

    fn link(source: u32, target: u32, cost: f64) -> LinkRef<u32> {
        LinkRef {
            source,
            target,
            cost,
        }
    }

    fn links() -> Vec<LinkRef<u32>> {
        vec![link(1, 2, 1.0), link(2, 3, 2.5)]
    }

    #[test]
    fn test_corrected() {
        let table = lookup_table();
        let lookup = |k: &u32| table.get(k).map(Vec::as_slice);
        let graph = serialize(&meta(), links(), lookup, SerializeMode::Corrected).unwrap();
        let ids: Vec<&str> = graph.nodes().iter().map(|n| n.id()).collect();
        assert_eq!(ids, vec!["10.0.0.1", "10.0.0.2", "10.0.0.3"]);
        assert_eq!(graph.nodes()[0].local_addresses(), &addrs(&["172.16.0.1", "192.168.0.1"])[..]);
        assert!(graph.nodes()[1].local_addresses().is_empty());
        assert_eq!(graph.links()[0], Link::new("10.0.0.1", "10.0.0.2", 1.0));
        assert_eq!(graph.links()[1], Link::new("10.0.0.2", "10.0.0.3", 2.5));
        assert_eq!(graph.meta(), meta());
    }

    #[test]
    fn test_faithful() {
        let table = lookup_table();
        let lookup = |k: &u32| table.get(k).map(Vec::as_slice);
        let graph = serialize(&meta(), links(), lookup, SerializeMode::Faithful).unwrap();
        let ids: Vec<&str> = graph.nodes().iter().map(|n| n.id()).collect();
        assert_eq!(ids, vec!["10.0.0.1", "10.0.0.2", "10.0.0.2", "10.0.0.3"]);
        assert_eq!(graph.links()[0], Link::new("10.0.0.1", "10.0.0.1", 1.0));
        assert_eq!(graph.links()[1], Link::new("10.0.0.2", "10.0.0.2", 2.5));
    }

    #[test]
    fn test_unresolved_node() {
        let table = lookup_table();
        let links = vec![link(1, 7, 1.0)];
        let lookup = |k: &u32| table.get(k).map(Vec::as_slice);
        assert_eq!(
            serialize(&meta(), links, lookup, SerializeMode::Corrected),
            Err(SerializationError::UnresolvedNode("7".to_string()))
        );
    }

    #[test]
    fn test_node_without_addresses() {
        let table = hashmap! { 1 => addrs(&["10.0.0.1"]), 2 => vec![] };
        let links = vec![link(1, 2, 1.0)];
        assert_eq!(
            serialize(&meta(), links, |k| table.get(k).map(Vec::as_slice), SerializeMode::Faithful),
            Err(SerializationError::EmptyNode("2".to_string()))
        );
    }

    #[test]
    fn test_no_links() {
        let table = lookup_table();
        let graph = serialize(
            &meta(),
            Vec::<LinkRef<u32>>::new(),
            |k| table.get(k).map(Vec::as_slice),
            SerializeMode::Corrected,
        )
        .unwrap();
        assert!(graph.nodes().is_empty());
        assert!(graph.links().is_empty());
    }
}
