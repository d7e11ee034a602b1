use super::ParseError;
use crate::netjson::{GraphMeta, Link, NetworkGraph, Node};

use std::collections::HashMap;

/// Collects nodes and links of protocols which identify nodes by several addresses. Aliases are
/// folded into the primary address of their node, nodes are kept in the order they are first
/// seen.
#[derive(Debug)]
pub(super) struct GraphBuilder {
    meta: GraphMeta,
    nodes: Vec<(String, Vec<String>)>,
    index: HashMap<String, usize>,
    aliases: HashMap<String, String>,
    links: Vec<Link>,
}

impl GraphBuilder {
    pub(super) fn new(meta: GraphMeta) -> Self {
        Self {
            meta,
            nodes: Vec::new(),
            index: HashMap::new(),
            aliases: HashMap::new(),
            links: Vec::new(),
        }
    }

    /// Declare a node together with its local addresses
    pub(super) fn add_node(&mut self, primary: &str, local_addresses: &[String]) {
        let idx = self.node_index(primary);
        for address in local_addresses {
            if address == primary || self.aliases.contains_key(address) {
                continue;
            }
            self.aliases.insert(address.clone(), primary.to_string());
            self.nodes[idx].1.push(address.clone());
        }
    }

    /// Add a link from `source` to `target`. Unknown endpoints become new nodes.
    pub(super) fn add_link(
        &mut self,
        source: &str,
        target: &str,
        cost: f64,
        field: &'static str,
    ) -> Result<(), ParseError> {
        if !cost.is_finite() {
            return Err(ParseError::InvalidValue {
                field,
                value: cost.to_string(),
            });
        }
        let source = self.resolve(source);
        let target = self.resolve(target);
        self.node_index(&source);
        self.node_index(&target);
        self.links.push(Link::new(source, target, cost));
        Ok(())
    }

    pub(super) fn build(self) -> Result<NetworkGraph, ParseError> {
        let nodes = self
            .nodes
            .into_iter()
            .map(|(id, local)| Node::with_local_addresses(id, local))
            .collect();
        Ok(NetworkGraph::new(self.meta, nodes, self.links)?)
    }

    fn resolve(&self, address: &str) -> String {
        self.aliases.get(address).cloned().unwrap_or_else(|| address.to_string())
    }

    fn node_index(&mut self, primary: &str) -> usize {
        if let Some(idx) = self.index.get(primary) {
            return *idx;
        }
        let idx = self.nodes.len();
        self.nodes.push((primary.to_string(), Vec::new()));
        self.index.insert(primary.to_string(), idx);
        idx
    }
}
