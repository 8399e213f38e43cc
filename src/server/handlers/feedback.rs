use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::server::feedback::FeedbackRecord;
use crate::state::AppState;

fn default_score_name() -> String {
    "user-feedback".to_string()
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    #[serde(default = "default_score_name")]
    pub score_name: String,
    pub question: String,
    pub answer: String,
    pub user_liked: bool,
    /// The user's own suggestion; only consulted when they disliked the reply.
    pub expected_output: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A liked reply becomes its own expected output; a disliked one takes the
/// user's suggestion, but blank suggestions are treated as absent.
fn resolve_expected_output(
    user_liked: bool,
    answer: &str,
    suggestion: Option<String>,
) -> Option<String> {
    if user_liked {
        Some(answer.to_string())
    } else {
        suggestion.filter(|text| !text.trim().is_empty())
    }
}

/// POST /api/feedback. Stores one feedback row. Failures are reported in the
/// response body rather than as an HTTP error so a broken sink never takes
/// the chat frontend down with it.
pub async fn feedback(
    State(state): State<Arc<AppState>>,
    Json(request): Json<FeedbackRequest>,
) -> Json<FeedbackResponse> {
    tracing::info!(user_liked = request.user_liked, "Feedback received");

    let expected_output =
        resolve_expected_output(request.user_liked, &request.answer, request.expected_output);

    let record = FeedbackRecord {
        id: Uuid::new_v4().to_string(),
        recorded_at: Utc::now().to_rfc3339(),
        score_name: request.score_name,
        model: state.settings.llm.model.clone(),
        question: request.question,
        answer: request.answer,
        user_liked: request.user_liked,
        expected_output,
        comment: request.comment,
    };

    match state.feedback.append(&record).await {
        Ok(()) => Json(FeedbackResponse {
            success: true,
            message: Some("feedback recorded".to_string()),
            error: None,
        }),
        Err(error) => {
            tracing::error!(%error, "Failed to store feedback");
            Json(FeedbackResponse {
                success: false,
                message: None,
                error: Some(error.to_string()),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn liked_reply_becomes_expected_output() {
        let resolved = resolve_expected_output(true, "ответ", Some("другое".to_string()));
        assert_eq!(resolved.as_deref(), Some("ответ"));
    }

    #[test]
    fn disliked_reply_takes_user_suggestion() {
        let resolved = resolve_expected_output(false, "ответ", Some("лучше так".to_string()));
        assert_eq!(resolved.as_deref(), Some("лучше так"));
    }

    #[test]
    fn blank_suggestion_counts_as_absent() {
        assert!(resolve_expected_output(false, "ответ", Some("   ".to_string())).is_none());
        assert!(resolve_expected_output(false, "ответ", None).is_none());
    }
}
