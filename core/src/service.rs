//! The fetch pipeline: build URL, fetch, parse.

use std::fmt;
use std::sync::Arc;
use std::thread;

use tracing::{debug, info};

use crate::client::BookClient;
use crate::config::SearchConfig;
use crate::fetch::{fetch, Fetcher, UreqFetcher};
use crate::http::HttpRequest;
use crate::parser::parse_books;
use crate::types::Book;

/// Runs before every request. Used for the optional artificial delay.
pub type PreFetchHook = Arc<dyn Fn(&HttpRequest) + Send + Sync>;

/// Anything that can answer a query with a list of books. The loader only
/// needs this much.
pub trait Search: Send + Sync {
    fn search(&self, query: &str) -> Vec<Book>;
}

/// One entry point from query to books.
///
/// `search` never fails: blank queries, bad URLs, bad statuses, transport
/// errors and unparseable bodies all end up as an empty vector.
pub struct BookSearchService<F = UreqFetcher> {
    client: BookClient,
    fetcher: F,
    pre_fetch: Option<PreFetchHook>,
}

impl BookSearchService<UreqFetcher> {
    pub fn new(config: &SearchConfig) -> Self {
        Self::with_fetcher(config, UreqFetcher)
    }
}

impl<F: Fetcher> BookSearchService<F> {
    pub fn with_fetcher(config: &SearchConfig, fetcher: F) -> Self {
        let service = Self {
            client: BookClient::from_config(config),
            fetcher,
            pre_fetch: None,
        };
        match config.artificial_delay {
            Some(delay) => service.with_pre_fetch_hook(Arc::new(move |_: &HttpRequest| {
                thread::sleep(delay);
            })),
            None => service,
        }
    }

    /// Replace the pre-fetch hook.
    pub fn with_pre_fetch_hook(mut self, hook: PreFetchHook) -> Self {
        self.pre_fetch = Some(hook);
        self
    }

    pub fn client(&self) -> &BookClient {
        &self.client
    }

    pub fn search(&self, query: &str) -> Vec<Book> {
        let Some(request) = self.client.build_search(query) else {
            debug!("blank query, skipping search");
            return Vec::new();
        };

        if let Some(hook) = &self.pre_fetch {
            hook(&request);
        }

        let body = match fetch(&self.fetcher, &request) {
            Ok(body) => body,
            Err(_) => return Vec::new(),
        };
        let books = parse_books(&body);
        info!(query = query.trim(), count = books.len(), "search finished");
        books
    }
}

impl<F: Fetcher> Search for BookSearchService<F> {
    fn search(&self, query: &str) -> Vec<Book> {
        BookSearchService::search(self, query)
    }
}

impl<F: fmt::Debug> fmt::Debug for BookSearchService<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BookSearchService")
            .field("client", &self.client)
            .field("fetcher", &self.fetcher)
            .field("pre_fetch", &self.pre_fetch.is_some())
            .finish()
    }
}
