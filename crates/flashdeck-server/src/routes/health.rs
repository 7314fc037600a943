use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use super::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Welcome to the flashdeck API" }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
