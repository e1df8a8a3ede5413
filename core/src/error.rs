//! Error types for the book search pipeline.
//!
//! # Design
//! Most variants never reach the caller of `BookSearchService::search`: they
//! are logged where they occur and collapsed into an empty result. They stay
//! typed so the fallible entry points (`fetch`, `try_parse_books`,
//! `SearchConfig::from_env`) can be inspected by tests and hosts.

use thiserror::Error;

/// Errors raised inside the fetch-and-parse pipeline.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The request URL is not an absolute `scheme://host/...` URI.
    #[error("invalid url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The connection could not be established or the body could not be read.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with something other than 200.
    #[error("unexpected HTTP status {status}")]
    Status { status: u16 },

    /// The body is not a book-search document.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// An environment variable holds a value of the wrong shape.
    #[error("invalid configuration value for {key}: {value:?}")]
    Config { key: &'static str, value: String },

    /// The loader could not start its worker thread.
    #[error("failed to spawn search worker: {0}")]
    Spawn(#[from] std::io::Error),
}
