use super::{ParseError, Parser};
use crate::netjson::NetworkGraph;

/// Parser for documents which already are NetJSON NetworkGraphs. The parsed graph keeps the
/// protocol, version and metric stated in the document.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetJsonParser;

impl Parser for NetJsonParser {
    fn protocol(&self) -> &str {
        "NetJSON"
    }

    fn version(&self) -> &str {
        "1.0"
    }

    fn metric(&self) -> &str {
        "cost"
    }

    fn parse(&self, payload: &str) -> Result<NetworkGraph, ParseError> {
        Ok(NetworkGraph::from_json(payload)?)
    }
}
