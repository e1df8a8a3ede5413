//! Verify `build_search` / `parse_search` against `test-vectors/search.json`.
//!
//! Each case gives a query, the URL it must produce, a simulated response and
//! the books that response must parse into. Expected books are compared as
//! values, so field order in the vector file does not matter.

use bookworm_core::{Book, BookClient, HttpResponse};

fn vectors() -> serde_json::Value {
    let raw = include_str!("../../test-vectors/search.json");
    serde_json::from_str(raw).unwrap()
}

#[test]
fn search_test_vectors() {
    let vectors = vectors();
    let client = BookClient::new(vectors["base_url"].as_str().unwrap());

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();

        // Verify build
        let req = client
            .build_search(case["query"].as_str().unwrap())
            .unwrap_or_else(|| panic!("{name}: no request built"));
        assert_eq!(req.url, case["expected_url"].as_str().unwrap(), "{name}: url");

        // Verify parse
        let sim = &case["simulated_response"];
        let response = HttpResponse {
            status: sim["status"].as_u64().unwrap() as u16,
            body: sim["body"].as_str().unwrap().to_string(),
        };
        let books = client.parse_search(response);
        let expected: Vec<Book> = serde_json::from_value(case["expected_books"].clone()).unwrap();
        assert_eq!(books, expected, "{name}: parsed books");
    }
}

#[test]
fn blank_query_test_vectors() {
    let vectors = vectors();
    let client = BookClient::new(vectors["base_url"].as_str().unwrap());

    for query in vectors["blank_queries"].as_array().unwrap() {
        let query = query.as_str().unwrap();
        assert!(client.build_search(query).is_none(), "{query:?} should not build a request");
    }
}
