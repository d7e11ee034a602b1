//! # Topodiff HTTP
//!
//! [`Transport`] reading topology payloads over HTTP(S) with isahc. Urls starting with
//! `file://`, or without any scheme, are read from the local file system.

use topodiff::{FetchError, Transport};

use isahc::error::ErrorKind;
use isahc::prelude::*;
use isahc::Request;
use log::{debug, trace};
use std::fs;
use std::time::Duration;

/// Transport for `http://`, `https://` and `file://` urls, and plain paths.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    user_agent: Option<String>,
}

impl HttpTransport {
    /// Create a new transport
    pub fn new() -> Self {
        Self::default()
    }

    /// Send `user_agent` with every request
    pub fn with_user_agent(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: Some(user_agent.into()),
        }
    }

    fn get_http(&self, url: &str, timeout: Duration) -> Result<String, FetchError> {
        let mut builder = Request::get(url).timeout(timeout);
        if let Some(user_agent) = self.user_agent.as_ref() {
            builder = builder.header("User-Agent", user_agent.as_str());
        }
        let request = builder.body(()).map_err(|e| network_error(url, e))?;

        let mut response = request.send().map_err(|e| map_error(url, timeout, e))?;
        let status = response.status();
        trace!("{} answered {}", url, status);
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        response.text().map_err(|e| network_error(url, e))
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str, timeout: Duration) -> Result<String, FetchError> {
        match local_path(url) {
            Some(path) => {
                debug!("Reading {}", path);
                fs::read_to_string(path).map_err(|source| FetchError::Io {
                    path: path.to_string(),
                    source,
                })
            }
            None => self.get_http(url, timeout),
        }
    }
}

/// Returns the file system path for `file://` urls and urls without a scheme
fn local_path(url: &str) -> Option<&str> {
    if let Some(path) = url.strip_prefix("file://") {
        return Some(path);
    }
    if url.contains("://") {
        None
    } else {
        Some(url)
    }
}

fn map_error(url: &str, timeout: Duration, error: isahc::Error) -> FetchError {
    match error.kind() {
        ErrorKind::Timeout => FetchError::Timeout {
            url: url.to_string(),
            timeout,
        },
        _ => network_error(url, error),
    }
}

fn network_error(url: &str, error: impl ToString) -> FetchError {
    FetchError::Network {
        url: url.to_string(),
        reason: error.to_string(),
    }
}
