//! Book search pipeline for the Bookworm client.
//!
//! # Overview
//! Turns a user query into a list of books from the Google Books `volumes`
//! endpoint: build the URL, GET it, parse the JSON. Failures anywhere along
//! the way become an empty list, never an error or a panic.
//!
//! # Design
//! - `BookClient` is the sans-IO half (`build_search` / `parse_search`), so a
//!   native host can run the HTTP round-trip itself.
//! - `Fetcher` is the transport seam; `UreqFetcher` is the blocking default.
//! - `BookSearchService` composes the two behind `search(query)`.
//! - `SearchLoader` runs searches on worker threads and delivers only the
//!   latest result.
//! - `SearchScreen` models the screen states a UI renders.

pub mod client;
pub mod config;
pub mod error;
pub mod fetch;
pub mod http;
pub mod loader;
pub mod parser;
pub mod screen;
pub mod service;
pub mod types;

pub use client::BookClient;
pub use config::{QueryEncoding, SearchConfig};
pub use error::SearchError;
pub use fetch::{fetch, EndpointReachable, Fetcher, UreqFetcher};
pub use http::{HttpRequest, HttpResponse};
pub use loader::{LoadCallback, LoadResult, SearchLoader, Ticket};
pub use parser::{parse_books, try_parse_books};
pub use screen::{AssumeOnline, Connectivity, EmptyState, ScreenState, SearchScreen};
pub use service::{BookSearchService, PreFetchHook, Search};
pub use types::Book;
