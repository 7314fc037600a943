use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use flashdeck_core::flashcard::{CardId, CardInput};
use flashdeck_service::FlashcardService;
use serde_json::{json, Value};
use tracing::info;

use super::{bad_body, to_error, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/flashcards", get(list_flashcards).post(create_flashcard))
        .route(
            "/flashcards/{id}",
            put(update_flashcard).delete(delete_flashcard),
        )
}

async fn list_flashcards(
    State(state): State<AppState>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state
        .service
        .list_flashcards()
        .await
        .map(|cards| Json(json!(cards)))
        .map_err(to_error)
}

async fn create_flashcard(
    State(state): State<AppState>,
    body: Result<Json<CardInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    let Json(input) = body.map_err(bad_body)?;
    let card = state
        .service
        .create_flashcard(&input)
        .await
        .map_err(to_error)?;
    info!(id = card.id, topic = card.topic_label(), "flashcard created");
    Ok((StatusCode::CREATED, Json(json!(card))))
}

async fn update_flashcard(
    State(state): State<AppState>,
    Path(id): Path<CardId>,
    body: Result<Json<CardInput>, JsonRejection>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let Json(input) = body.map_err(bad_body)?;
    state
        .service
        .update_flashcard(id, &input)
        .await
        .map(|card| Json(json!(card)))
        .map_err(to_error)
}

async fn delete_flashcard(
    State(state): State<AppState>,
    Path(id): Path<CardId>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state
        .service
        .delete_flashcard(id)
        .await
        .map_err(to_error)?;
    info!(id, "flashcard deleted");
    Ok(Json(json!({ "result": "success", "message": "Flashcard deleted" })))
}
