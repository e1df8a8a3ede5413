//! Stateless request builder and response parser for the book-search API.
//!
//! # Design
//! `BookClient` holds the endpoint prefix, timeouts and query encoding and
//! carries no mutable state between calls. A search is split into
//! `build_search`, which produces an `HttpRequest`, and `parse_search`,
//! which consumes an `HttpResponse`. Whoever sits in between does the I/O:
//! a `Fetcher` inside `BookSearchService`, or a native host through the C
//! ABI.

use std::time::Duration;

use tracing::{debug, error};

use crate::config::{QueryEncoding, SearchConfig};
use crate::error::SearchError;
use crate::http::{HttpRequest, HttpResponse};
use crate::parser::parse_books;
use crate::types::Book;

#[derive(Debug, Clone)]
pub struct BookClient {
    base_url: String,
    connect_timeout: Duration,
    read_timeout: Duration,
    query_encoding: QueryEncoding,
}

impl BookClient {
    /// Client for `base_url` with the default timeouts and no query encoding.
    pub fn new(base_url: &str) -> Self {
        Self::from_config(&SearchConfig {
            base_url: base_url.to_string(),
            ..SearchConfig::default()
        })
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            connect_timeout: config.connect_timeout,
            read_timeout: config.read_timeout,
            query_encoding: config.query_encoding,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the search request for `query`.
    ///
    /// The query is trimmed and appended to the base URL as is, unless the
    /// client was configured with `QueryEncoding::Percent`. Returns `None`
    /// when nothing is left to search for.
    pub fn build_search(&self, query: &str) -> Option<HttpRequest> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        let url = match self.query_encoding {
            QueryEncoding::Raw => format!("{}{}", self.base_url, query),
            QueryEncoding::Percent => {
                format!("{}{}", self.base_url, urlencoding::encode(query))
            }
        };
        Some(HttpRequest {
            url,
            connect_timeout: self.connect_timeout,
            read_timeout: self.read_timeout,
        })
    }

    /// Turn a search response into books. Any status other than 200 gives an
    /// empty list.
    pub fn parse_search(&self, response: HttpResponse) -> Vec<Book> {
        if let Err(err) = check_status(&response) {
            error!(error = %err, "error response code");
            return Vec::new();
        }
        debug!(bytes = response.body.len(), "parsing search response");
        parse_books(&response.body)
    }
}

/// Map every status except 200 to `SearchError::Status`.
pub(crate) fn check_status(response: &HttpResponse) -> Result<(), SearchError> {
    if response.is_ok() {
        return Ok(());
    }
    Err(SearchError::Status {
        status: response.status,
    })
}
