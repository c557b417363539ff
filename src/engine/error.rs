// SPDX-License-Identifier: MIT

//! Typed error handling for process-manager-rs
//!
//! Two tiers of failure exist:
//! - `EngineError` is returned to the caller (loading graphs, serving).
//! - `ActionError` never leaves a handler; its message is written into the
//!   session under the action's error key and the chain follows `on_failure`.

use thiserror::Error;

/// Hard errors surfaced synchronously to the caller
#[derive(Debug, Error)]
pub enum EngineError {
    /// Graph files must carry a `.json` extension
    #[error("{0} is not a json file")]
    NotJson(String),

    /// I/O errors (unreadable graph file, socket bind)
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Malformed graph JSON
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// HTTP server failure
    #[error("Server error: {0}")]
    Server(String),
}

/// Soft errors produced while a handler runs
#[derive(Debug, Error)]
pub enum ActionError {
    /// Action arguments could not be bound into the handler's shape
    #[error("{0}")]
    Bind(#[from] serde_json::Error),

    /// Target URL is not an absolute URL
    #[error("parse {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// HTTP method is not a valid token
    #[error("invalid method {0:?}")]
    InvalidMethod(String),

    /// Transport failure, including deadline expiry
    #[error(transparent)]
    Request(#[from] reqwest::Error),

    /// Response body could not be read
    #[error("reading response body: {0}")]
    Body(String),
}

impl ActionError {
    /// Create an invalid url error
    pub fn invalid_url(url: impl Into<String>, source: url::ParseError) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            source,
        }
    }
}
