//! Book-search JSON parsing.
//!
//! # Design
//! Parsing is all-or-nothing: the document is deserialized in one pass, so a
//! single entry without `volumeInfo` (or with an array or object where text
//! belongs) rejects the whole batch. `parse_books` never fails outward;
//! `try_parse_books` keeps the reason for callers that want it.

use tracing::{debug, error};

use crate::error::SearchError;
use crate::types::{Book, VolumesResponse};

/// Parse a search document into books, in document order.
///
/// Blank input and any structural problem both yield an empty vector. They
/// differ only in what gets logged.
pub fn parse_books(raw: &str) -> Vec<Book> {
    if raw.trim().is_empty() {
        debug!("empty response body, nothing to parse");
        return Vec::new();
    }
    match try_parse_books(raw) {
        Ok(books) => {
            debug!(count = books.len(), "parsed search results");
            books
        }
        Err(err) => {
            error!(error = %err, "problem parsing the book JSON results");
            Vec::new()
        }
    }
}

/// Like `parse_books`, but reports why a non-blank document was rejected.
pub fn try_parse_books(raw: &str) -> Result<Vec<Book>, SearchError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let response: VolumesResponse = serde_json::from_str(raw)?;
    Ok(response
        .items
        .into_iter()
        .map(|volume| Book::from(volume.volume_info))
        .collect())
}
