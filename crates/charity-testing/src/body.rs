//! Response body helpers.

use axum::body::{Body, to_bytes};
use axum::response::Response;
use serde_json::Value;

/// Collect a response body and parse it as JSON.
///
/// Panics on read failure or invalid JSON.
pub async fn json_body(resp: Response<Body>) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("reading response body");
    serde_json::from_slice(&bytes).expect("response body is JSON")
}
