use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::core::errors::ApiError;
use crate::llm::ChatMessage;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Raw conversation so far, newest message last.
    #[serde(default)]
    pub history: Vec<ChatMessage>,
    /// Cleaned counterpart of `history`; this is what the pipeline consumes.
    #[serde(default)]
    pub clear_history: Vec<ChatMessage>,
    pub session_id: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub clear_query: String,
    pub history: Vec<ChatMessage>,
    pub clear_history: Vec<ChatMessage>,
}

/// POST /api/chat. Runs the query pipeline and returns the answer together
/// with both histories extended by the new exchange. The raw history gets the
/// message as typed; the cleaned history gets the normalized query, so a
/// client can echo `clear_history` back on the next turn unchanged.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if request.message.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "message must not be empty".to_string(),
        ));
    }

    tracing::info!(
        session_id = request.session_id.as_deref().unwrap_or("-"),
        user_id = request.user_id.as_deref().unwrap_or("-"),
        "Chat request received"
    );

    let reply = state
        .pipeline
        .run(&request.message, request.clear_history.clone())
        .await
        .map_err(|error| {
            tracing::error!(%error, "Chat pipeline failed");
            ApiError::internal("failed to process the request")
        })?;

    let mut history = request.history;
    history.push(ChatMessage::user(request.message));
    history.push(ChatMessage::assistant(reply.response.clone()));

    let mut clear_history = request.clear_history;
    clear_history.push(ChatMessage::user(reply.cleaned_query.clone()));
    clear_history.push(ChatMessage::assistant(reply.response.clone()));

    Ok(Json(ChatResponse {
        response: reply.response,
        clear_query: reply.cleaned_query,
        history,
        clear_history,
    }))
}
