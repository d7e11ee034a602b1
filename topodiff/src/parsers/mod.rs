//! Parsers turning raw topology payloads into NetworkGraphs, and the registry which maps a
//! configured format identifier to a parser.

mod batman;
mod builder;
mod netjson;
mod olsr;

pub use batman::BatmanParser;
pub use netjson::NetJsonParser;
pub use olsr::OlsrParser;

use crate::netjson::{GraphError, GraphMeta, NetworkGraph};

use log::debug;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;
use thiserror::Error;

/// Errors while parsing a payload
#[derive(Error, Debug)]
pub enum ParseError {
    /// The payload is not valid JSON or does not have the expected structure
    #[error("Malformed payload: {0}")]
    Json(#[from] serde_json::Error),
    /// A required member is missing
    #[error("Missing member `{0}`")]
    MissingField(&'static str),
    /// A member has a value that cannot be interpreted
    #[error("Invalid value for `{field}`: {value}")]
    InvalidValue {
        /// Name of the member
        field: &'static str,
        /// The value found in the payload
        value: String,
    },
    /// The parsed data does not form a valid graph
    #[error("Invalid graph: {0}")]
    Graph(#[from] GraphError),
}

/// The format identifier does not resolve to a registered parser
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Parser {0:?} is not registered")]
pub struct UnknownParserError(pub String);

/// A parser for one topology format.
pub trait Parser: Debug + Send + Sync {
    /// Routing protocol described by this format
    fn protocol(&self) -> &str;

    /// Version of the routing protocol implementation
    fn version(&self) -> &str;

    /// Name of the metric used as link cost
    fn metric(&self) -> &str;

    /// Parse a raw payload
    fn parse(&self, payload: &str) -> Result<NetworkGraph, ParseError>;

    /// Protocol, version and metric of this parser
    fn meta(&self) -> GraphMeta {
        GraphMeta::new(self.protocol(), self.version(), self.metric())
    }
}

/// Maps format identifiers to parsers.
#[derive(Debug, Clone, Default)]
pub struct ParserRegistry {
    parsers: BTreeMap<String, Arc<dyn Parser>>,
}

impl ParserRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry containing the parsers shipped with this crate: `netjson`, `olsr`
    /// and `batman-adv`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("netjson", NetJsonParser);
        registry.register("olsr", OlsrParser);
        registry.register("batman-adv", BatmanParser);
        registry
    }

    /// Register a parser. Returns the parser previously registered under the same id.
    pub fn register<P: Parser + 'static>(
        &mut self,
        id: impl Into<String>,
        parser: P,
    ) -> Option<Arc<dyn Parser>> {
        let id = id.into();
        debug!("Registering parser {} ({})", id, parser.protocol());
        self.parsers.insert(id, Arc::new(parser))
    }

    /// Resolve a format identifier
    pub fn get(&self, id: &str) -> Result<Arc<dyn Parser>, UnknownParserError> {
        self.parsers.get(id).cloned().ok_or_else(|| UnknownParserError(id.to_string()))
    }

    /// Returns true if a parser is registered under `id`
    pub fn contains(&self, id: &str) -> bool {
        self.parsers.contains_key(id)
    }

    /// Registered parsers, sorted by id
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn Parser>)> {
        self.parsers.iter().map(|(id, p)| (id.as_str(), p))
    }

    /// Keep only the parsers whose id is listed in `ids`. Fails if one of the ids is not
    /// registered.
    pub fn restrict<S: AsRef<str>>(&self, ids: &[S]) -> Result<Self, UnknownParserError> {
        let mut parsers = BTreeMap::new();
        for id in ids {
            let id = id.as_ref();
            parsers.insert(id.to_string(), self.get(id)?);
        }
        Ok(Self { parsers })
    }
}
