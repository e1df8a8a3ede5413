//! Search configuration.
//!
//! Defaults match the public Google Books endpoint and the timeouts the
//! mobile client has always used. `from_env` lets binaries and tests point
//! the pipeline elsewhere without code changes.

use std::env;
use std::time::Duration;

use crate::error::SearchError;

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/books/v1/volumes?q=";
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(15_000);
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(10_000);

/// How the user query is appended to the base URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QueryEncoding {
    /// Appended verbatim. A query containing spaces or other characters that
    /// are not legal in a URI produces an invalid URL and therefore no
    /// results.
    #[default]
    Raw,
    /// Percent-encoded before it is appended.
    Percent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Endpoint prefix the query is concatenated onto, e.g. `...?q=`.
    pub base_url: String,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    /// Sleep before every request. Off unless asked for.
    pub artificial_delay: Option<Duration>,
    pub query_encoding: QueryEncoding,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            artificial_delay: None,
            query_encoding: QueryEncoding::Raw,
        }
    }
}

impl SearchConfig {
    /// Build a config from `BOOKWORM_*` environment variables, falling back
    /// to the defaults for anything unset.
    pub fn from_env() -> Result<Self, SearchError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SearchError> {
        let mut config = Self::default();
        if let Some(url) = lookup("BOOKWORM_BASE_URL") {
            config.base_url = url;
        }
        if let Some(ms) = timeout(&lookup, "BOOKWORM_CONNECT_TIMEOUT_MS")? {
            config.connect_timeout = ms;
        }
        if let Some(ms) = timeout(&lookup, "BOOKWORM_READ_TIMEOUT_MS")? {
            config.read_timeout = ms;
        }
        config.artificial_delay = millis(&lookup, "BOOKWORM_DELAY_MS")?.filter(|d| !d.is_zero());
        if let Some(value) = lookup("BOOKWORM_ENCODE_QUERY") {
            config.query_encoding = match value.as_str() {
                "1" | "true" | "yes" => QueryEncoding::Percent,
                "0" | "false" | "no" => QueryEncoding::Raw,
                _ => {
                    return Err(SearchError::Config {
                        key: "BOOKWORM_ENCODE_QUERY",
                        value,
                    })
                }
            };
        }
        Ok(config)
    }
}

fn millis(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<Duration>, SearchError> {
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map(|ms| Some(Duration::from_millis(ms)))
            .map_err(|_| SearchError::Config { key, value }),
    }
}

/// Like `millis`, but zero is rejected: it would fail every request at once.
fn timeout(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<Duration>, SearchError> {
    match millis(lookup, key)? {
        Some(d) if d.is_zero() => Err(SearchError::Config {
            key,
            value: "0".to_string(),
        }),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_the_mobile_client() {
        let config = SearchConfig::default();
        assert_eq!(config.base_url, "https://www.googleapis.com/books/v1/volumes?q=");
        assert_eq!(config.connect_timeout, Duration::from_secs(15));
        assert_eq!(config.read_timeout, Duration::from_secs(10));
        assert!(config.artificial_delay.is_none());
        assert_eq!(config.query_encoding, QueryEncoding::Raw);
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = SearchConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, SearchConfig::default());
    }

    #[test]
    fn environment_overrides_every_field() {
        let config = SearchConfig::from_lookup(lookup(&[
            ("BOOKWORM_BASE_URL", "http://127.0.0.1:3000/books/v1/volumes?q="),
            ("BOOKWORM_CONNECT_TIMEOUT_MS", "500"),
            ("BOOKWORM_READ_TIMEOUT_MS", "750"),
            ("BOOKWORM_DELAY_MS", "2000"),
            ("BOOKWORM_ENCODE_QUERY", "true"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:3000/books/v1/volumes?q=");
        assert_eq!(config.connect_timeout, Duration::from_millis(500));
        assert_eq!(config.read_timeout, Duration::from_millis(750));
        assert_eq!(config.artificial_delay, Some(Duration::from_secs(2)));
        assert_eq!(config.query_encoding, QueryEncoding::Percent);
    }

    #[test]
    fn zero_delay_disables_the_hook() {
        let config = SearchConfig::from_lookup(lookup(&[("BOOKWORM_DELAY_MS", "0")])).unwrap();
        assert!(config.artificial_delay.is_none());
    }

    #[test]
    fn bad_timeout_is_rejected() {
        let err = SearchConfig::from_lookup(lookup(&[("BOOKWORM_READ_TIMEOUT_MS", "soon")]))
            .unwrap_err();
        assert!(matches!(
            err,
            SearchError::Config { key: "BOOKWORM_READ_TIMEOUT_MS", .. }
        ));
    }

    #[test]
    fn zero_timeouts_are_rejected() {
        for key in ["BOOKWORM_CONNECT_TIMEOUT_MS", "BOOKWORM_READ_TIMEOUT_MS"] {
            let err = SearchConfig::from_lookup(lookup(&[(key, "0")])).unwrap_err();
            assert!(
                matches!(err, SearchError::Config { key: k, .. } if k == key),
                "{key}: {err:?}"
            );
        }
    }

    #[test]
    fn bad_encoding_flag_is_rejected() {
        let err =
            SearchConfig::from_lookup(lookup(&[("BOOKWORM_ENCODE_QUERY", "maybe")])).unwrap_err();
        assert!(matches!(err, SearchError::Config { .. }));
    }
}
