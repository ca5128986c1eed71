use axum::{Json, extract::State};
use uuid::Uuid;

use crate::{
    error::AppError,
    message::{ChatRequest, ChatResponse},
    state::SharedState,
};

pub async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let trimmed = payload.message.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest("Message cannot be empty".to_string()));
    }

    let thread_id = match &payload.thread_id {
        Some(t) if !t.trim().is_empty() => t.clone(),
        _ => Uuid::new_v4().to_string(),
    };

    let response = state.adapter.reply(&thread_id, trimmed).await?;

    Ok(Json(ChatResponse {
        thread_id,
        response,
    }))
}
