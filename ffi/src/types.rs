//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type with C-compatible fields: `*mut c_char`
//! instead of `String`, pointer plus length instead of `Vec`, milliseconds
//! instead of `Duration`. Conversion helpers live here to keep `lib.rs`
//! focused on the `extern "C"` surface.

use std::ffi::{c_void, CString};
use std::os::raw::c_char;
use std::sync::Arc;

use bookworm_core::{Book, BookSearchService, HttpRequest, SearchLoader};

/// Opaque handle to a `BookSearchService`.
pub struct FfiBookService {
    pub(crate) inner: Arc<BookSearchService>,
}

/// Opaque handle to a `SearchLoader`. Freeing it stops all deliveries.
pub struct FfiSearchLoader {
    pub(crate) inner: SearchLoader,
}

/// Called on a worker thread when the current search finishes.
///
/// The callee owns `result` and must release it with `bookworm_free_result`.
pub type FfiLoadCallback =
    extern "C" fn(user_data: *mut c_void, ticket: u64, result: *mut FfiBookResult);

/// Host callback plus its context pointer.
pub(crate) struct HostCallback {
    pub callback: FfiLoadCallback,
    pub user_data: *mut c_void,
}

// The C caller promises that `user_data` may be used from any thread for as
// long as the loader is alive.
unsafe impl Send for HostCallback {}
unsafe impl Sync for HostCallback {}

impl HostCallback {
    pub(crate) fn deliver(&self, ticket: u64, result: *mut FfiBookResult) {
        (self.callback)(self.user_data, ticket, result);
    }
}

// ---------------------------------------------------------------------------
// Request / response
// ---------------------------------------------------------------------------

/// A GET request the host should execute.
#[repr(C)]
pub struct FfiHttpRequest {
    pub url: *mut c_char,
    pub connect_timeout_ms: u32,
    pub read_timeout_ms: u32,
}

impl FfiHttpRequest {
    pub(crate) fn from_core(req: HttpRequest) -> *mut Self {
        let millis = |d: std::time::Duration| u32::try_from(d.as_millis()).unwrap_or(u32::MAX);
        Box::into_raw(Box::new(FfiHttpRequest {
            url: to_c_string(req.url),
            connect_timeout_ms: millis(req.connect_timeout),
            read_timeout_ms: millis(req.read_timeout),
        }))
    }
}

/// The host's answer to an `FfiHttpRequest`. Owned by the caller; the FFI
/// layer only reads it.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[repr(C)]
pub enum FfiErrorCode {
    Ok = 0,
    NullArg = 1,
    Panic = 2,
}

/// One book. All three strings are always non-null, possibly empty.
#[repr(C)]
pub struct FfiBook {
    pub title: *mut c_char,
    pub subtitle: *mut c_char,
    pub author: *mut c_char,
}

/// Result envelope for every operation that yields books.
///
/// On success `error_code` is `Ok`, `error_message` is null and `books`
/// points to `len` entries (null when `len` is 0). A search that found
/// nothing, or failed on the network, is still `Ok` with `len == 0`.
#[repr(C)]
pub struct FfiBookResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub books: *mut FfiBook,
    pub len: u32,
}

impl FfiBookResult {
    pub(crate) fn ok_books(books: Vec<Book>) -> *mut Self {
        let ffi_books: Box<[FfiBook]> = books
            .into_iter()
            .map(|b| FfiBook {
                title: to_c_string(b.title().to_string()),
                subtitle: to_c_string(b.subtitle().to_string()),
                author: to_c_string(b.author().to_string()),
            })
            .collect();

        // Released in `bookworm_free_result` as a boxed slice of `len`.
        let len = ffi_books.len() as u32;
        let books = if ffi_books.is_empty() {
            std::ptr::null_mut()
        } else {
            Box::into_raw(ffi_books) as *mut FfiBook
        };

        Box::into_raw(Box::new(FfiBookResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            books,
            len,
        }))
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::error(FfiErrorCode::NullArg, format!("null argument: {name}"))
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::error(FfiErrorCode::Panic, msg.to_string())
    }

    fn error(error_code: FfiErrorCode, msg: String) -> *mut Self {
        Box::into_raw(Box::new(FfiBookResult {
            error_code,
            error_message: to_c_string(msg),
            books: std::ptr::null_mut(),
            len: 0,
        }))
    }
}

/// Heap-allocate `s` as a C string. Interior NUL bytes are dropped rather
/// than failing the whole conversion.
pub(crate) fn to_c_string(s: String) -> *mut c_char {
    let c = CString::new(s).unwrap_or_else(|e| {
        let mut bytes = e.into_vec();
        bytes.retain(|&b| b != 0);
        CString::new(bytes).unwrap_or_default()
    });
    c.into_raw()
}
