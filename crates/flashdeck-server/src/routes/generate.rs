use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use flashdeck_core::flashcard::GenerateRequest;
use flashdeck_service::FlashcardService;
use serde_json::{json, Value};
use tracing::info;

use super::{bad_body, to_error, AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/generate_flashcards", post(generate_flashcards))
}

async fn generate_flashcards(
    State(state): State<AppState>,
    body: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let Json(request) = body.map_err(bad_body)?;
    info!(
        topic = %request.topic,
        n = request.n,
        backend = state.service.generator_name(),
        "generating flashcards"
    );
    state
        .service
        .generate_flashcards(&request)
        .await
        .map(|cards| Json(json!(cards)))
        .map_err(to_error)
}
