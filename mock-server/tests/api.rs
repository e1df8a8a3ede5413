use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with_catalog, volume, Volumes};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

// --- search ---

#[tokio::test]
async fn search_returns_matching_volumes() {
    let resp = app()
        .oneshot(get("/books/v1/volumes?q=dune"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let volumes: Volumes = body_json(resp).await;
    assert_eq!(volumes.kind, "books#volumes");
    assert_eq!(volumes.total_items, 3);
    let titles: Vec<String> = volumes
        .items
        .unwrap()
        .into_iter()
        .map(|v| v.volume_info.title.unwrap())
        .collect();
    assert_eq!(titles, ["Dune", "Dune Messiah", "Children of Dune"]);
}

#[tokio::test]
async fn search_decodes_plus_and_percent_escapes() {
    for uri in [
        "/books/v1/volumes?q=good+omens",
        "/books/v1/volumes?q=good%20omens",
    ] {
        let resp = app().oneshot(get(uri)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "{uri}");
        let volumes: Volumes = body_json(resp).await;
        assert_eq!(volumes.total_items, 1, "{uri}");
    }
}

#[tokio::test]
async fn search_with_author_prefix() {
    let resp = app()
        .oneshot(get("/books/v1/volumes?q=inauthor:gaiman"))
        .await
        .unwrap();

    let volumes: Volumes = body_json(resp).await;
    let items = volumes.items.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(
        items[0].volume_info.authors.as_deref().unwrap(),
        ["Terry Pratchett", "Neil Gaiman"]
    );
}

#[tokio::test]
async fn search_without_matches_omits_items() {
    let resp = app()
        .oneshot(get("/books/v1/volumes?q=zzzzzz"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json: serde_json::Value = body_json(resp).await;
    assert_eq!(json["totalItems"], 0);
    assert!(json.get("items").is_none());
}

#[tokio::test]
async fn search_without_query_returns_400() {
    for uri in ["/books/v1/volumes", "/books/v1/volumes?q=", "/books/v1/volumes?q=%20"] {
        let resp = app().oneshot(get(uri)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
        let json: serde_json::Value = body_json(resp).await;
        assert_eq!(json["error"]["code"], 400);
    }
}

#[tokio::test]
async fn search_uses_the_supplied_catalog() {
    let app = app_with_catalog(vec![volume("x", "Only Book", None, &[])]);
    let resp = app
        .oneshot(get("/books/v1/volumes?q=only"))
        .await
        .unwrap();

    let volumes: Volumes = body_json(resp).await;
    let items = volumes.items.unwrap();
    assert_eq!(items.len(), 1);
    assert!(items[0].volume_info.authors.is_none());
}

// --- failure endpoints ---

#[tokio::test]
async fn status_endpoint_returns_requested_code() {
    let resp = app().oneshot(get("/status/503?q=dune")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn status_endpoint_rejects_non_numeric_code() {
    let resp = app().oneshot(get("/status/teapot")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_endpoint_returns_broken_json() {
    let resp = app().oneshot(get("/malformed?q=dune")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = body_bytes(resp).await;
    assert!(serde_json::from_slice::<serde_json::Value>(&bytes).is_err());
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let resp = app().oneshot(get("/books/v2/volumes?q=dune")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
