//! Single-flight background search.
//!
//! # Design
//! Every `start` runs one search on its own worker thread and makes that
//! search the current one. Nothing is cancelled: an older search finishes
//! normally and its result is dropped because its ticket is no longer
//! current. Delivery and `close` share one mutex, so once `close` returns the
//! callback can never run again, and a result is checked and handed over
//! without a newer `start` slipping in between.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

use tracing::debug;

use crate::error::SearchError;
use crate::service::Search;
use crate::types::Book;

/// Identifies one call to `SearchLoader::start`. Later starts get larger
/// tickets.
pub type Ticket = u64;

/// A finished search, handed to the loader callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadResult {
    pub ticket: Ticket,
    /// The trimmed query the search ran with.
    pub query: String,
    pub books: Vec<Book>,
}

pub type LoadCallback = Arc<dyn Fn(LoadResult) + Send + Sync>;

#[derive(Debug, Default)]
struct LoaderState {
    current: Ticket,
    closed: bool,
}

pub struct SearchLoader {
    search: Arc<dyn Search>,
    on_result: LoadCallback,
    state: Arc<Mutex<LoaderState>>,
}

impl SearchLoader {
    /// `on_result` runs on the worker thread with the delivery lock held, so
    /// it must hand the result off rather than call back into the loader.
    pub fn new(search: Arc<dyn Search>, on_result: LoadCallback) -> Self {
        Self {
            search,
            on_result,
            state: Arc::new(Mutex::new(LoaderState::default())),
        }
    }

    /// Launch a search for `query`, superseding any search still running.
    ///
    /// Returns the ticket the result will carry. A result is delivered when
    /// its ticket is still the current one at the moment the search ends, so
    /// during a burst of starts an earlier ticket that finished before the
    /// next `start` can still arrive ahead of the latest one. Tickets arrive
    /// in increasing order. After `close` no thread is started and the
    /// returned ticket is never delivered.
    pub fn start(&self, query: &str) -> Result<Ticket, SearchError> {
        let ticket = {
            let mut state = lock(&self.state);
            state.current += 1;
            if state.closed {
                return Ok(state.current);
            }
            state.current
        };

        let query = query.trim().to_string();
        let search = Arc::clone(&self.search);
        let on_result = Arc::clone(&self.on_result);
        let state = Arc::clone(&self.state);

        debug!(ticket, query = %query, "starting background search");
        thread::Builder::new()
            .name(format!("bookworm-search-{ticket}"))
            .spawn(move || {
                let books = search.search(&query);
                let state = lock(&state);
                if state.closed || state.current != ticket {
                    debug!(ticket, "discarding superseded search result");
                    return;
                }
                on_result(LoadResult {
                    ticket,
                    query,
                    books,
                });
                drop(state);
            })?;
        Ok(ticket)
    }

    /// Ticket of the most recent `start`, or 0 before the first one.
    pub fn current(&self) -> Ticket {
        lock(&self.state).current
    }

    /// Stop delivering results. Blocks while a delivery is in progress.
    pub fn close(&self) {
        lock(&self.state).closed = true;
    }

    pub fn is_closed(&self) -> bool {
        lock(&self.state).closed
    }
}

impl Drop for SearchLoader {
    fn drop(&mut self) {
        self.close();
    }
}

fn lock(state: &Mutex<LoaderState>) -> MutexGuard<'_, LoaderState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
