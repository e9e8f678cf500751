use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::storage::RepositoryError;

/// Failure taxonomy shared by every academic workflow and its HTTP surface.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("{0}")]
    InvalidInput(String),
    /// Field-level validation failures collected from a registration payload.
    #[error("validation failed: {}", .0.join("; "))]
    InvalidFields(Vec<String>),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    UpstreamUnavailable(String),
    #[error(transparent)]
    Storage(#[from] RepositoryError),
}

impl WorkflowError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            WorkflowError::InvalidInput(_) | WorkflowError::InvalidFields(_) => {
                StatusCode::BAD_REQUEST
            }
            WorkflowError::NotFound(_) => StatusCode::NOT_FOUND,
            WorkflowError::Conflict(_) => StatusCode::CONFLICT,
            WorkflowError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            WorkflowError::Storage(RepositoryError::NotFound { .. }) => StatusCode::NOT_FOUND,
            WorkflowError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WorkflowError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "workflow request failed");
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "workflow request rejected");
        }

        let payload = match &self {
            WorkflowError::InvalidFields(details) => json!({
                "error": "validation failed",
                "details": details,
            }),
            other => json!({ "error": other.to_string() }),
        };
        (status, axum::Json(payload)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_http_status() {
        let cases = [
            (WorkflowError::InvalidInput("bad".into()), StatusCode::BAD_REQUEST),
            (
                WorkflowError::InvalidFields(vec!["dni".into()]),
                StatusCode::BAD_REQUEST,
            ),
            (WorkflowError::NotFound("gone".into()), StatusCode::NOT_FOUND),
            (WorkflowError::Conflict("twice".into()), StatusCode::CONFLICT),
            (
                WorkflowError::UpstreamUnavailable("down".into()),
                StatusCode::BAD_GATEWAY,
            ),
            (
                WorkflowError::Storage(RepositoryError::DatabaseQueryError("disk".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                WorkflowError::Storage(RepositoryError::not_found("enrollment", 4)),
                StatusCode::NOT_FOUND,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.status_code(), expected, "{error}");
        }
    }
}
