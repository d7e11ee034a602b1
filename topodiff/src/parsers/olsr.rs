use super::builder::GraphBuilder;
use super::{ParseError, Parser};
use crate::netjson::NetworkGraph;

use serde::Deserialize;

/// olsrd reports `tcEdgeCost` as fixed point number with this scale
const OLSR_COST_SCALE: f64 = 1024.0;

/// Parser for the `jsoninfo` plugin output of olsrd (`/topology` and `/mid`).
///
/// Every entry of `topology` becomes a link from `lastHopIP` to `destinationIP`, with cost
/// `tcEdgeCost / 1024`. The optional `mid` table provides the local addresses of a node.
#[derive(Debug, Clone, Copy, Default)]
pub struct OlsrParser;

#[derive(Deserialize)]
struct JsonInfo {
    topology: Option<Vec<TopologyEntry>>,
    #[serde(default)]
    mid: Vec<MidEntry>,
}

#[derive(Deserialize)]
struct TopologyEntry {
    #[serde(rename = "lastHopIP")]
    last_hop: String,
    #[serde(rename = "destinationIP")]
    destination: String,
    #[serde(rename = "tcEdgeCost")]
    cost: f64,
}

#[derive(Deserialize)]
struct MidEntry {
    #[serde(rename = "ipAddress")]
    address: String,
    #[serde(default)]
    aliases: Vec<MidAlias>,
}

#[derive(Deserialize)]
struct MidAlias {
    #[serde(rename = "ipAddress")]
    address: String,
}

impl Parser for OlsrParser {
    fn protocol(&self) -> &str {
        "OLSR"
    }

    fn version(&self) -> &str {
        "0.8"
    }

    fn metric(&self) -> &str {
        "ETX"
    }

    fn parse(&self, payload: &str) -> Result<NetworkGraph, ParseError> {
        let info: JsonInfo = serde_json::from_str(payload)?;
        let topology = info.topology.ok_or(ParseError::MissingField("topology"))?;

        let mut builder = GraphBuilder::new(self.meta());
        for mid in info.mid.iter() {
            let aliases: Vec<String> = mid.aliases.iter().map(|a| a.address.clone()).collect();
            builder.add_node(&mid.address, &aliases);
        }
        for entry in topology.iter() {
            let cost = entry.cost / OLSR_COST_SCALE;
            builder.add_link(&entry.last_hop, &entry.destination, cost, "tcEdgeCost")?;
        }
        builder.build()
    }
}
