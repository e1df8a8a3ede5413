use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::net::TcpListener;
use tracing::info;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VolumeInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<String>>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Volume {
    pub id: String,
    #[serde(rename = "volumeInfo")]
    pub volume_info: VolumeInfo,
}

/// Search response. Like the real API, `items` is left out entirely when
/// nothing matches.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Volumes {
    pub kind: String,
    #[serde(rename = "totalItems")]
    pub total_items: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<Volume>>,
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

pub type Catalog = Arc<Vec<Volume>>;

pub fn volume(id: &str, title: &str, subtitle: Option<&str>, authors: &[&str]) -> Volume {
    Volume {
        id: id.to_string(),
        volume_info: VolumeInfo {
            title: Some(title.to_string()),
            subtitle: subtitle.map(str::to_string),
            authors: if authors.is_empty() {
                None
            } else {
                Some(authors.iter().map(|a| a.to_string()).collect())
            },
        },
    }
}

pub fn default_catalog() -> Vec<Volume> {
    vec![
        volume("dune-1", "Dune", None, &["Frank Herbert"]),
        volume("dune-2", "Dune Messiah", None, &["Frank Herbert"]),
        volume("dune-3", "Children of Dune", None, &["Frank Herbert"]),
        volume(
            "omens",
            "Good Omens",
            Some("The Nice and Accurate Prophecies of Agnes Nutter, Witch"),
            &["Terry Pratchett", "Neil Gaiman"],
        ),
        volume(
            "left-hand",
            "The Left Hand of Darkness",
            None,
            &["Ursula K. Le Guin"],
        ),
        volume("beowulf", "Beowulf", Some("A New Verse Translation"), &[]),
    ]
}

pub fn app() -> Router {
    app_with_catalog(default_catalog())
}

pub fn app_with_catalog(catalog: Vec<Volume>) -> Router {
    let catalog: Catalog = Arc::new(catalog);
    Router::new()
        .route("/books/v1/volumes", get(search_volumes))
        .route("/status/{code}", get(fixed_status))
        .route("/malformed", get(malformed))
        .with_state(catalog)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn search_volumes(
    State(catalog): State<Catalog>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Volumes>, (StatusCode, Json<serde_json::Value>)> {
    let query = params.q.unwrap_or_default();
    let query = query.trim();
    if query.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": {
                    "code": 400,
                    "message": "Missing query.",
                    "errors": [{"domain": "global", "reason": "queryRequired"}]
                }
            })),
        ));
    }

    let items: Vec<Volume> = catalog
        .iter()
        .filter(|v| matches_query(&v.volume_info, query))
        .cloned()
        .collect();
    info!(query, matches = items.len(), "volumes search");

    Ok(Json(Volumes {
        kind: "books#volumes".to_string(),
        total_items: items.len(),
        items: if items.is_empty() { None } else { Some(items) },
    }))
}

async fn fixed_status(Path(code): Path<u16>) -> impl IntoResponse {
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST)
}

async fn malformed() -> impl IntoResponse {
    (StatusCode::OK, r#"{"items": [ {"volumeInfo": "#)
}

/// Every whitespace-separated term must match. `intitle:` and `inauthor:`
/// restrict a term to one field; a bare term may match title, subtitle or
/// any author. Matching ignores case.
pub fn matches_query(info: &VolumeInfo, query: &str) -> bool {
    let title = info.title.as_deref().unwrap_or_default().to_lowercase();
    let subtitle = info.subtitle.as_deref().unwrap_or_default().to_lowercase();
    let authors: Vec<String> = info
        .authors
        .iter()
        .flatten()
        .map(|a| a.to_lowercase())
        .collect();

    query.split_whitespace().all(|term| {
        let term = term.to_lowercase();
        if let Some(t) = term.strip_prefix("intitle:") {
            title.contains(t)
        } else if let Some(a) = term.strip_prefix("inauthor:") {
            authors.iter().any(|name| name.contains(a))
        } else {
            title.contains(&term)
                || subtitle.contains(&term)
                || authors.iter().any(|name| name.contains(&term))
        }
    })
}
