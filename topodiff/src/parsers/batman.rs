use super::builder::GraphBuilder;
use super::{ParseError, Parser};
use crate::netjson::NetworkGraph;

use serde::Deserialize;

/// Parser for the `vis` output of batman-adv, as served by alfred.
///
/// Every entry of `vis` declares a node by its `primary` address, its `secondary` addresses
/// are used as local addresses. Each neighbor entry becomes a link from `router` to
/// `neighbor` with the reported `metric` as cost.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatmanParser;

#[derive(Deserialize)]
struct Vis {
    vis: Option<Vec<VisEntry>>,
}

#[derive(Deserialize)]
struct VisEntry {
    primary: String,
    #[serde(default)]
    secondary: Vec<String>,
    #[serde(default)]
    neighbors: Vec<Neighbor>,
}

#[derive(Deserialize)]
struct Neighbor {
    router: String,
    neighbor: String,
    metric: Metric,
}

/// alfred reports the metric as string, older releases as number
#[derive(Deserialize)]
#[serde(untagged)]
enum Metric {
    Number(f64),
    Text(String),
}

impl Metric {
    fn value(&self) -> Result<f64, ParseError> {
        match self {
            Metric::Number(n) => Ok(*n),
            Metric::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| ParseError::InvalidValue {
                    field: "metric",
                    value: s.clone(),
                }),
        }
    }
}

impl Parser for BatmanParser {
    fn protocol(&self) -> &str {
        "batman-adv"
    }

    fn version(&self) -> &str {
        "2015.0"
    }

    fn metric(&self) -> &str {
        "TQ"
    }

    fn parse(&self, payload: &str) -> Result<NetworkGraph, ParseError> {
        let vis: Vis = serde_json::from_str(payload)?;
        let entries = vis.vis.ok_or(ParseError::MissingField("vis"))?;

        let mut builder = GraphBuilder::new(self.meta());
        for entry in entries.iter() {
            builder.add_node(&entry.primary, &entry.secondary);
        }
        for neighbor in entries.iter().flat_map(|e| e.neighbors.iter()) {
            let cost = neighbor.metric.value()?;
            builder.add_link(&neighbor.router, &neighbor.neighbor, cost, "metric")?;
        }
        builder.build()
    }
}
