use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

// ---------------------------------------------------------------------------
// ApiError: HTTP boundary
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn internal<E: std::fmt::Display>(err: E) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}

// ---------------------------------------------------------------------------
// StageError: pipeline failures
// ---------------------------------------------------------------------------

/// Failure of a pipeline stage or of an upstream service it called.
///
/// Upstream errors keep the HTTP status and raw payload of the failing call;
/// the stage name identifies which part of the pipeline gave up. None of
/// these are retried inside the pipeline; a failed invocation is aborted
/// and no partial result is returned.
#[derive(Debug, Clone, Error)]
pub enum StageError {
    #[error("Stage '{stage}' upstream call failed with status {status}: {body}")]
    Upstream {
        stage: String,
        status: u16,
        body: String,
    },

    #[error("Stage '{stage}' failed: {message}")]
    Failed { stage: String, message: String },

    #[error("Stage '{stage}' received malformed model output: {detail}")]
    Malformed { stage: String, detail: String },

    #[error("Pipeline timed out after {seconds}s")]
    Timeout { seconds: u64 },
}

impl StageError {
    pub fn upstream(stage: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self::Upstream {
            stage: stage.into(),
            status,
            body: body.into(),
        }
    }

    pub fn failed(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            stage: stage.into(),
            message: message.into(),
        }
    }

    pub fn malformed(stage: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Malformed {
            stage: stage.into(),
            detail: detail.into(),
        }
    }
}
