#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, Response},
};

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .expect("failed to build request")
}

/// Builds a GET /api/download request for the given post URL, with the
/// URL percent-encoded into the query string.
pub fn download_request(post_url: &str) -> Request<Body> {
    get_request(&format!("/api/download?url={}", urlencoding::encode(post_url)))
}

pub async fn read_json_response(res: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(res.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&bytes).expect("failed to parse response json")
}
