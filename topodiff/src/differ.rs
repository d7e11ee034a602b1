//! Comparison of two NetworkGraph snapshots.

use crate::netjson::{Link, NetworkGraph, Node};

use itertools::{EitherOrBoth, Itertools};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A link present in both snapshots whose cost differs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangedLink {
    /// Id of the source node
    pub source: String,
    /// Id of the target node
    pub target: String,
    /// Cost in the current snapshot
    pub old_cost: f64,
    /// Cost in the latest snapshot
    pub new_cost: f64,
}

/// Differences between a current and a latest snapshot. Every list is sorted by identifier:
/// nodes by id, links by `(source, target)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    /// Link endpoints only present in the latest snapshot
    pub added_nodes: Vec<Node>,
    /// Link endpoints only present in the current snapshot
    pub removed_nodes: Vec<Node>,
    /// Links only present in the latest snapshot
    pub added_links: Vec<Link>,
    /// Links only present in the current snapshot
    pub removed_links: Vec<Link>,
    /// Links present in both snapshots with a different cost
    pub changed_links: Vec<ChangedLink>,
}

impl Delta {
    /// Returns true if both snapshots are equivalent
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn len(&self) -> usize {
        self.added_nodes.len()
            + self.removed_nodes.len()
            + self.added_links.len()
            + self.removed_links.len()
            + self.changed_links.len()
    }
}

/// Compute the delta leading from `current` to `latest`.
///
/// Nodes are compared by id, links by their directed `(source, target)` pair. If a graph
/// repeats a node or link, its first occurrence is used. Neither graph is modified.
///
/// Nodes are only discovered through links: a node is reported as added or removed only if
/// it is the endpoint of a link in the graph it is taken from. Nodes without any link never
/// show up in the delta.
pub fn diff(current: &NetworkGraph, latest: &NetworkGraph) -> Delta {
    let mut delta = Delta::default();

    let current_nodes = index_nodes(current);
    let latest_nodes = index_nodes(latest);
    let current_endpoints = endpoints(current);
    let latest_endpoints = endpoints(latest);
    for entry in current_nodes.into_iter().merge_join_by(latest_nodes, |a, b| a.0.cmp(b.0)) {
        match entry {
            EitherOrBoth::Left((id, node)) if current_endpoints.contains(&id) => {
                delta.removed_nodes.push(node.clone())
            }
            EitherOrBoth::Right((id, node)) if latest_endpoints.contains(&id) => {
                delta.added_nodes.push(node.clone())
            }
            _ => {}
        }
    }

    let current_links = index_links(current);
    let latest_links = index_links(latest);
    for entry in current_links.into_iter().merge_join_by(latest_links, |a, b| a.0.cmp(&b.0)) {
        match entry {
            EitherOrBoth::Left((_, link)) => delta.removed_links.push(link.clone()),
            EitherOrBoth::Right((_, link)) => delta.added_links.push(link.clone()),
            EitherOrBoth::Both((_, old), (_, new)) => {
                if old.cost() != new.cost() {
                    delta.changed_links.push(ChangedLink {
                        source: old.source().to_string(),
                        target: old.target().to_string(),
                        old_cost: old.cost(),
                        new_cost: new.cost(),
                    });
                }
            }
        }
    }

    delta
}

fn index_nodes(graph: &NetworkGraph) -> BTreeMap<&str, &Node> {
    let mut index = BTreeMap::new();
    for node in graph.nodes() {
        index.entry(node.id()).or_insert(node);
    }
    index
}

fn endpoints(graph: &NetworkGraph) -> BTreeSet<&str> {
    graph.links().iter().flat_map(|l| [l.source(), l.target()]).collect()
}

fn index_links(graph: &NetworkGraph) -> BTreeMap<(&str, &str), &Link> {
    let mut index = BTreeMap::new();
    for link in graph.links() {
        index.entry(link.key()).or_insert(link);
    }
    index
}
