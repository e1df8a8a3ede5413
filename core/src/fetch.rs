//! Blocking HTTP transport.
//!
//! # Design
//! `Fetcher` is the seam between the pipeline and the network: it executes
//! one `HttpRequest` and reports what came back, with status codes as data.
//! The free function `fetch` layers the pipeline's policy on top of any
//! fetcher: reject malformed URLs, hand back the body on 200, and turn every
//! other status or transport failure into empty content after logging it.

use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, error};
use ureq::http::uri::{InvalidUri, Uri};

use crate::client::check_status;
use crate::error::SearchError;
use crate::http::{HttpRequest, HttpResponse};
use crate::screen::Connectivity;

/// Executes a single GET request.
///
/// Implementations must block until the request finishes and must not treat
/// non-200 statuses as errors; `Err` is reserved for transport failures.
pub trait Fetcher: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, SearchError>;
}

/// `Fetcher` backed by a fresh ureq agent per request.
///
/// The agent, its connection and the response body are owned by `execute`
/// and dropped on every return path, so nothing outlives the call.
#[derive(Debug, Clone, Copy, Default)]
pub struct UreqFetcher;

impl Fetcher for UreqFetcher {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, SearchError> {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_connect(Some(request.connect_timeout))
            .timeout_recv_response(Some(request.read_timeout))
            .timeout_recv_body(Some(request.read_timeout))
            .build()
            .new_agent();

        let mut response = agent
            .get(&request.url)
            .call()
            .map_err(|e| SearchError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = if status == 200 {
            response
                .body_mut()
                .read_to_string()
                .map_err(|e| SearchError::Transport(e.to_string()))?
        } else {
            String::new()
        };

        Ok(HttpResponse { status, body })
    }
}

/// Check that `url` is an absolute http(s) URL with a host.
pub fn validate_url(url: &str) -> Result<(), SearchError> {
    parse_url(url).map(|_| ())
}

fn parse_url(url: &str) -> Result<Uri, SearchError> {
    let invalid = |reason: String| SearchError::InvalidUrl {
        url: url.to_string(),
        reason,
    };
    let uri: Uri = url
        .parse()
        .map_err(|e: InvalidUri| invalid(e.to_string()))?;
    match uri.scheme_str() {
        Some("http") | Some("https") => {}
        Some(other) => return Err(invalid(format!("unsupported scheme {other}"))),
        None => return Err(invalid("missing scheme".to_string())),
    }
    if uri.host().map_or(true, str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }
    Ok(uri)
}

/// `Connectivity` for hosts without a network-state API: the network counts
/// as up when a TCP connection to the search endpoint opens within `timeout`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointReachable {
    host: String,
    port: u16,
    timeout: Duration,
}

impl EndpointReachable {
    /// Check the host and port of `url`, e.g. a `SearchConfig::base_url`.
    pub fn for_url(url: &str, timeout: Duration) -> Result<Self, SearchError> {
        let uri = parse_url(url)?;
        let port = uri
            .port_u16()
            .unwrap_or(if uri.scheme_str() == Some("https") { 443 } else { 80 });
        let host = uri
            .host()
            .unwrap_or_default()
            .trim_start_matches('[')
            .trim_end_matches(']')
            .to_string();
        Ok(Self {
            host,
            port,
            timeout,
        })
    }
}

impl Connectivity for EndpointReachable {
    fn is_connected(&self) -> bool {
        let addrs = match (self.host.as_str(), self.port).to_socket_addrs() {
            Ok(addrs) => addrs,
            Err(err) => {
                debug!(host = %self.host, error = %err, "search host does not resolve");
                return false;
            }
        };
        addrs
            .into_iter()
            .any(|addr| TcpStream::connect_timeout(&addr, self.timeout).is_ok())
    }
}

/// Fetch the body of `request.url`.
///
/// Only a malformed URL is reported as `Err`. A non-200 status or a
/// transport failure is logged and yields an empty string.
pub fn fetch<F: Fetcher + ?Sized>(fetcher: &F, request: &HttpRequest) -> Result<String, SearchError> {
    if let Err(err) = validate_url(&request.url) {
        error!(error = %err, "problem building the request URL");
        return Err(err);
    }

    debug!(url = %request.url, "fetching search results");
    let response = match fetcher.execute(request) {
        Ok(response) => response,
        Err(err) => {
            error!(url = %request.url, error = %err, "problem retrieving the book JSON results");
            return Ok(String::new());
        }
    };

    match check_status(&response) {
        Ok(()) => Ok(response.body),
        Err(err) => {
            error!(url = %request.url, error = %err, "error response code");
            Ok(String::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Canned {
        result: fn() -> Result<HttpResponse, SearchError>,
        calls: AtomicUsize,
    }

    impl Canned {
        fn new(result: fn() -> Result<HttpResponse, SearchError>) -> Self {
            Self {
                result,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl Fetcher for Canned {
        fn execute(&self, _request: &HttpRequest) -> Result<HttpResponse, SearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.result)()
        }
    }

    fn request(url: &str) -> HttpRequest {
        HttpRequest {
            url: url.to_string(),
            connect_timeout: Duration::from_secs(15),
            read_timeout: Duration::from_secs(10),
        }
    }

    #[test]
    fn ok_response_returns_body() {
        let fetcher = Canned::new(|| {
            Ok(HttpResponse {
                status: 200,
                body: "{}".to_string(),
            })
        });
        let body = fetch(&fetcher, &request("http://localhost/v?q=x")).unwrap();
        assert_eq!(body, "{}");
    }

    #[test]
    fn non_200_returns_empty_content() {
        let fetcher = Canned::new(|| {
            Ok(HttpResponse {
                status: 503,
                body: "unavailable".to_string(),
            })
        });
        let body = fetch(&fetcher, &request("http://localhost/v?q=x")).unwrap();
        assert!(body.is_empty());
    }

    #[test]
    fn transport_failure_returns_empty_content() {
        let fetcher = Canned::new(|| Err(SearchError::Transport("connection refused".to_string())));
        let body = fetch(&fetcher, &request("http://localhost/v?q=x")).unwrap();
        assert!(body.is_empty());
    }

    #[test]
    fn invalid_url_fails_without_touching_the_network() {
        let fetcher = Canned::new(|| unreachable!());
        let err = fetch(&fetcher, &request("http://localhost/v?q=two words")).unwrap_err();
        assert!(matches!(err, SearchError::InvalidUrl { .. }));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn validate_url_accepts_absolute_http_urls() {
        assert!(validate_url("https://www.googleapis.com/books/v1/volumes?q=dune").is_ok());
        assert!(validate_url("http://127.0.0.1:3000/books/v1/volumes?q=").is_ok());
    }

    #[test]
    fn validate_url_rejects_relative_and_foreign_urls() {
        assert!(validate_url("/books/v1/volumes?q=dune").is_err());
        assert!(validate_url("ftp://example.com/books").is_err());
        assert!(validate_url("").is_err());
    }

    #[test]
    fn endpoint_defaults_port_from_scheme() {
        let https = EndpointReachable::for_url(
            "https://www.googleapis.com/books/v1/volumes?q=",
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!((https.host.as_str(), https.port), ("www.googleapis.com", 443));

        let http = EndpointReachable::for_url("http://[::1]:3000/v?q=", Duration::from_secs(1))
            .unwrap();
        assert_eq!((http.host.as_str(), http.port), ("::1", 3000));
    }

    #[test]
    fn endpoint_rejects_invalid_urls() {
        let err = EndpointReachable::for_url("not a url", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, SearchError::InvalidUrl { .. }));
    }

    #[test]
    fn listening_endpoint_is_connected() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let endpoint =
            EndpointReachable::for_url(&format!("http://{addr}/v?q="), Duration::from_secs(2))
                .unwrap();
        assert!(endpoint.is_connected());
    }

    #[test]
    fn closed_endpoint_is_not_connected() {
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        let endpoint =
            EndpointReachable::for_url(&format!("http://{addr}/v?q="), Duration::from_secs(2))
                .unwrap();
        assert!(!endpoint.is_connected());
    }
}
