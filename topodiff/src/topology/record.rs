use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Persistable form of a [`Topology`](super::Topology).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyRecord {
    pub id: Uuid,
    pub label: String,
    pub parser: String,
    pub url: String,
    #[serde(default)]
    pub protocol: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub revision: String,
    #[serde(default)]
    pub metric: String,
    #[serde(default)]
    pub nodes: Vec<Vec<String>>,
    #[serde(default)]
    pub links: Vec<LinkRecord>,
}

/// Persistable form of a link
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinkRecord {
    /// Index into [`TopologyRecord::nodes`]
    pub source: usize,
    pub target: usize,
    pub cost: f64,
}
