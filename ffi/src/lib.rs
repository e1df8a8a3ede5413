//! C-ABI wrapper around `bookworm-core`.
//!
//! # Overview
//! Lets a native UI shell (Android, iOS, desktop) run book searches through
//! `extern "C"` functions. Two modes are offered:
//! - host-does-IO: `bookworm_build_search` gives the URL and timeouts, the
//!   host performs the GET, `bookworm_parse_search` turns the response into
//!   books;
//! - library-does-IO: `bookworm_search` blocks on the whole pipeline, and
//!   the loader runs it on a worker thread and calls back with the latest
//!   result only.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - A single `FfiBookResult` envelope carries books or an error code.
//! - The C caller owns all returned pointers and must call the matching
//!   `*_free` function to release them.

pub mod types;

use std::borrow::Cow;
use std::ffi::{c_void, CStr, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use bookworm_core::{BookSearchService, HttpResponse, LoadResult, SearchConfig, SearchLoader};
use tracing::error;

use types::*;

/// Borrow a C string argument. Invalid UTF-8 is replaced, not rejected.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that outlives the
/// returned value.
unsafe fn c_str<'a>(ptr: *const c_char) -> Option<Cow<'a, str>> {
    if ptr.is_null() {
        None
    } else {
        Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy())
    }
}

// ---------------------------------------------------------------------------
// Service lifecycle
// ---------------------------------------------------------------------------

/// Create a search service whose requests go to `base_url` + query.
///
/// Returns null if `base_url` is null or an internal panic occurs. The caller
/// must free the returned pointer with `bookworm_service_free`.
#[unsafe(no_mangle)]
pub extern "C" fn bookworm_service_new(base_url: *const c_char) -> *mut FfiBookService {
    catch_unwind(|| {
        let Some(url) = (unsafe { c_str(base_url) }) else {
            return std::ptr::null_mut();
        };
        let config = SearchConfig {
            base_url: url.into_owned(),
            ..SearchConfig::default()
        };
        let service = BookSearchService::new(&config);
        Box::into_raw(Box::new(FfiBookService {
            inner: Arc::new(service),
        }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Create a search service configured from the `BOOKWORM_*` environment
/// variables. Returns null if one of them holds an invalid value.
#[unsafe(no_mangle)]
pub extern "C" fn bookworm_service_new_from_env() -> *mut FfiBookService {
    catch_unwind(|| match SearchConfig::from_env() {
        Ok(config) => Box::into_raw(Box::new(FfiBookService {
            inner: Arc::new(BookSearchService::new(&config)),
        })),
        Err(err) => {
            error!(error = %err, "invalid search configuration");
            std::ptr::null_mut()
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a service created by `bookworm_service_new*`. Safe to call with null.
///
/// Loaders created from the service keep their own reference and stay valid.
#[unsafe(no_mangle)]
pub extern "C" fn bookworm_service_free(service: *mut FfiBookService) {
    if !service.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(service) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Host-does-IO
// ---------------------------------------------------------------------------

/// Build the GET request for `query`.
///
/// Returns null if an argument is null or the query is blank; in the latter
/// case no search should be made. Free the result with
/// `bookworm_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn bookworm_build_search(
    service: *const FfiBookService,
    query: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(AssertUnwindSafe(|| {
        if service.is_null() {
            return std::ptr::null_mut();
        }
        let Some(query) = (unsafe { c_str(query) }) else {
            return std::ptr::null_mut();
        };
        let service = unsafe { &*service };
        match service.inner.client().build_search(&query) {
            Some(req) => FfiHttpRequest::from_core(req),
            None => std::ptr::null_mut(),
        }
    }))
    .unwrap_or(std::ptr::null_mut())
}

fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    let body = unsafe { c_str(resp.body) }
        .map(Cow::into_owned)
        .unwrap_or_default();
    HttpResponse {
        status: resp.status,
        body,
    }
}

/// Parse the host's response to a request from `bookworm_build_search`.
///
/// A non-200 status or an unparseable body gives an `Ok` result with no
/// books.
#[unsafe(no_mangle)]
pub extern "C" fn bookworm_parse_search(
    service: *const FfiBookService,
    response: *const FfiHttpResponse,
) -> *mut FfiBookResult {
    catch_unwind(AssertUnwindSafe(|| {
        if service.is_null() {
            return FfiBookResult::null_arg("service");
        }
        if response.is_null() {
            return FfiBookResult::null_arg("response");
        }
        let service = unsafe { &*service };
        let resp = unsafe { &*response };
        let books = service.inner.client().parse_search(ffi_response_to_core(resp));
        FfiBookResult::ok_books(books)
    }))
    .unwrap_or_else(|_| FfiBookResult::panic("panic in bookworm_parse_search"))
}

// ---------------------------------------------------------------------------
// Library-does-IO
// ---------------------------------------------------------------------------

/// Run a whole search on the calling thread. Blocks for up to the connect
/// plus read timeout; never call it from a UI thread.
#[unsafe(no_mangle)]
pub extern "C" fn bookworm_search(
    service: *const FfiBookService,
    query: *const c_char,
) -> *mut FfiBookResult {
    catch_unwind(AssertUnwindSafe(|| {
        if service.is_null() {
            return FfiBookResult::null_arg("service");
        }
        let Some(query) = (unsafe { c_str(query) }) else {
            return FfiBookResult::null_arg("query");
        };
        let service = unsafe { &*service };
        FfiBookResult::ok_books(service.inner.search(&query))
    }))
    .unwrap_or_else(|_| FfiBookResult::panic("panic in bookworm_search"))
}

/// Create a loader that runs searches of `service` in the background.
///
/// `callback` is invoked on a worker thread, once per delivered search,
/// with `user_data` passed through untouched. It must not call back into the
/// loader; post the result to the UI thread instead. Returns null if
/// `service` or `callback` is null.
#[unsafe(no_mangle)]
pub extern "C" fn bookworm_loader_new(
    service: *const FfiBookService,
    callback: Option<FfiLoadCallback>,
    user_data: *mut c_void,
) -> *mut FfiSearchLoader {
    catch_unwind(AssertUnwindSafe(|| {
        if service.is_null() {
            return std::ptr::null_mut();
        }
        let Some(callback) = callback else {
            return std::ptr::null_mut();
        };
        let service = unsafe { &*service };
        let host = HostCallback {
            callback,
            user_data,
        };
        let loader = SearchLoader::new(
            service.inner.clone(),
            Arc::new(move |result: LoadResult| {
                host.deliver(result.ticket, FfiBookResult::ok_books(result.books));
            }),
        );
        Box::into_raw(Box::new(FfiSearchLoader { inner: loader }))
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Start a background search for `query`, superseding the previous one.
///
/// Returns the ticket the callback will receive, or 0 if nothing was
/// started (null argument, worker thread could not be spawned).
#[unsafe(no_mangle)]
pub extern "C" fn bookworm_loader_start(
    loader: *const FfiSearchLoader,
    query: *const c_char,
) -> u64 {
    catch_unwind(AssertUnwindSafe(|| {
        if loader.is_null() {
            return 0;
        }
        let Some(query) = (unsafe { c_str(query) }) else {
            return 0;
        };
        let loader = unsafe { &*loader };
        match loader.inner.start(&query) {
            Ok(ticket) => ticket,
            Err(err) => {
                error!(error = %err, "could not start background search");
                0
            }
        }
    }))
    .unwrap_or(0)
}

/// Tear a loader down. Once this returns the callback will not be invoked
/// again, although searches already running finish in the background.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn bookworm_loader_free(loader: *mut FfiSearchLoader) {
    if !loader.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(loader) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` from `bookworm_build_search`. Safe to call with
/// null.
#[unsafe(no_mangle)]
pub extern "C" fn bookworm_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.url);
    });
}

/// Free an `FfiBookResult`, including every book it holds. Safe to call with
/// null.
#[unsafe(no_mangle)]
pub extern "C" fn bookworm_free_result(result: *mut FfiBookResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        if !result.books.is_null() && result.len > 0 {
            let books: Box<[FfiBook]> = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    result.books,
                    result.len as usize,
                ))
            };
            for book in books.iter() {
                free_c_string(book.title);
                free_c_string(book.subtitle);
                free_c_string(book.author);
            }
        }
    });
}

fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
