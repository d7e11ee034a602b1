//! Retrieval of the latest remote snapshot.
//!
//! A [`GraphFetcher`] combines a [`Transport`], which reads the raw payload, with the
//! [`ParserRegistry`], which knows how to make sense of it. Reading is always bounded by a
//! timeout, and a failed or timed out read never yields a partial graph.

use crate::netjson::NetworkGraph;
use crate::parsers::{Parser, ParserRegistry};
use crate::Error;

use log::{debug, info};
use std::collections::HashMap;
use std::time::Duration;

/// Timeout used when fetching a snapshot, unless configured otherwise
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors while reading a payload
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    /// No response within the timeout
    #[error("Fetching {url} timed out after {timeout:?}")]
    Timeout {
        /// The requested url
        url: String,
        /// The timeout that elapsed
        timeout: Duration,
    },
    /// The server answered with a non-success status
    #[error("Fetching {url} returned status {status}")]
    Status {
        /// The requested url
        url: String,
        /// The HTTP status code
        status: u16,
    },
    /// Connection or protocol failure
    #[error("Fetching {url} failed: {reason}")]
    Network {
        /// The requested url
        url: String,
        /// Description of the failure
        reason: String,
    },
    /// A local file could not be read
    #[error("Reading {path} failed: {source}")]
    Io {
        /// Path of the file
        path: String,
        /// Underlying error
        source: std::io::Error,
    },
}

/// Reads the raw payload behind an url.
pub trait Transport {
    /// Read the whole payload at `url`, giving up after `timeout`
    fn get(&self, url: &str, timeout: Duration) -> Result<String, FetchError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, url: &str, timeout: Duration) -> Result<String, FetchError> {
        (**self).get(url, timeout)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn get(&self, url: &str, timeout: Duration) -> Result<String, FetchError> {
        (**self).get(url, timeout)
    }
}

/// Transport serving fixed payloads from memory. Urls without a payload fail with a network
/// error.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    payloads: HashMap<String, String>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `payload` at `url`
    pub fn insert(&mut self, url: impl Into<String>, payload: impl Into<String>) {
        self.payloads.insert(url.into(), payload.into());
    }
}

impl Transport for MemoryTransport {
    fn get(&self, url: &str, _timeout: Duration) -> Result<String, FetchError> {
        self.payloads.get(url).cloned().ok_or_else(|| FetchError::Network {
            url: url.to_string(),
            reason: "no payload available".to_string(),
        })
    }
}

/// Fetches and parses remote snapshots.
#[derive(Debug)]
pub struct GraphFetcher<T> {
    transport: T,
    registry: ParserRegistry,
}

impl<T: Transport> GraphFetcher<T> {
    pub fn new(transport: T, registry: ParserRegistry) -> Self {
        Self {
            transport,
            registry,
        }
    }

    /// Registry used to resolve parser ids
    pub fn registry(&self) -> &ParserRegistry {
        &self.registry
    }

    /// Fetch the snapshot at `url` and parse it with the parser registered as `parser_id`.
    /// The parser is resolved before anything is read.
    pub fn fetch(
        &self,
        url: &str,
        parser_id: &str,
        timeout: Duration,
    ) -> Result<NetworkGraph, Error> {
        let parser = self.registry.get(parser_id)?;
        self.fetch_with(url, parser.as_ref(), timeout)
    }

    /// Fetch the snapshot at `url` and parse it with `parser`.
    pub fn fetch_with(
        &self,
        url: &str,
        parser: &dyn Parser,
        timeout: Duration,
    ) -> Result<NetworkGraph, Error> {
        debug!("Fetching {} (timeout {:?})", url, timeout);
        let payload = self.transport.get(url, timeout)?;
        let graph = parser.parse(&payload)?;
        info!("Fetched {}: {} nodes, {} links", url, graph.nodes().len(), graph.links().len());
        Ok(graph)
    }
}
