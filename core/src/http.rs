//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! A search is always a single GET, so a request is just a URL plus the two
//! timeouts the transport must honour. `BookClient` builds requests and
//! parses responses without touching the network; either the host or a
//! `Fetcher` executes them in between.

use std::time::Duration;

/// A GET request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}
