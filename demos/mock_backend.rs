//! Echo backend for trying the gateway by hand.
//!
//! ```text
//! cargo run --example mock_backend
//! BACKEND_URL=http://127.0.0.1:3000 APP_ENV=development cargo run
//! curl -X POST --data hello http://127.0.0.1:4000/api/upload
//! ```

use axum::{
    body::Bytes,
    http::{HeaderMap, Method, Uri},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Value> {
    let headers: serde_json::Map<String, Value> = headers
        .iter()
        .map(|(k, v)| (k.to_string(), json!(v.to_str().unwrap_or_default())))
        .collect();

    Json(json!({
        "method": method.as_str(),
        "path": uri.path(),
        "query": uri.query(),
        "headers": headers,
        "body_len": body.len(),
    }))
}

#[tokio::main]
async fn main() {
    let app = Router::new()
        .route("/health", get(|| async { Json(json!({ "status": "healthy" })) }))
        .fallback(echo);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    println!("Mock backend listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
