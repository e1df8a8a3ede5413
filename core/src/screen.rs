//! Headless model of the search screen.
//!
//! # Design
//! The screen owns no widgets. It tracks which of five states the host should
//! render and decides, on submit, whether a search should be launched at all.
//! The three empty states stay distinct even though the pipeline returns the
//! same empty vector for "nothing found" and "could not parse".

use tracing::{debug, warn};

use crate::types::Book;

/// Answers "is there a usable network right now?" for the host platform.
pub trait Connectivity {
    fn is_connected(&self) -> bool;
}

impl<F: Fn() -> bool> Connectivity for F {
    fn is_connected(&self) -> bool {
        self()
    }
}

/// For hosts without a connectivity API: always claims to be online.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeOnline;

impl Connectivity for AssumeOnline {
    fn is_connected(&self) -> bool {
        true
    }
}

/// Why the list is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    EnterQuery,
    NoConnection,
    NoMatches,
}

impl EmptyState {
    pub fn message(self) -> &'static str {
        match self {
            EmptyState::EnterQuery => "Enter a search query",
            EmptyState::NoConnection => "No internet connection",
            EmptyState::NoMatches => "No matches found",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenState {
    Empty(EmptyState),
    Loading,
    Results(Vec<Book>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchScreen {
    state: ScreenState,
    query: Option<String>,
}

impl Default for SearchScreen {
    fn default() -> Self {
        Self {
            state: ScreenState::Empty(EmptyState::EnterQuery),
            query: None,
        }
    }
}

impl SearchScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ScreenState {
        &self.state
    }

    /// Trimmed query of the last submit that went ahead.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Handle the search button.
    ///
    /// Returns the trimmed query when a search should be launched; the screen
    /// is then `Loading` until `finish`. A blank query or a missing network
    /// leave the screen in the matching empty state and return `None`.
    pub fn submit(&mut self, raw_query: &str, connectivity: &dyn Connectivity) -> Option<String> {
        let query = raw_query.trim();
        if query.is_empty() {
            debug!("submit with blank query");
            self.query = None;
            self.state = ScreenState::Empty(EmptyState::EnterQuery);
            return None;
        }
        if !connectivity.is_connected() {
            warn!("no network connection, search not started");
            self.state = ScreenState::Empty(EmptyState::NoConnection);
            return None;
        }
        self.query = Some(query.to_string());
        self.state = ScreenState::Loading;
        Some(query.to_string())
    }

    /// Show the outcome of the search launched by the last `submit`.
    pub fn finish(&mut self, books: Vec<Book>) {
        self.state = if !books.is_empty() {
            ScreenState::Results(books)
        } else if self.query.is_some() {
            ScreenState::Empty(EmptyState::NoMatches)
        } else {
            ScreenState::Empty(EmptyState::EnterQuery)
        };
    }

    /// Forget the current results, e.g. when the host tears the list down.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
