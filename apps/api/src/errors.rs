use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Input error: {0}")]
    Input(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Answer coverage error: {0}")]
    AnswerCoverage(String),

    #[error("insufficient {difficulty} {problem_type} problems: requested {requested}, available {available}")]
    InsufficientData {
        difficulty: &'static str,
        problem_type: &'static str,
        requested: usize,
        available: usize,
    },

    #[error("Render error: {0}")]
    Render(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Input(msg) => (StatusCode::BAD_REQUEST, "INPUT_ERROR", msg.clone()),
            AppError::Parse(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "PARSE_ERROR",
                msg.clone(),
            ),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::AnswerCoverage(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "ANSWER_COVERAGE",
                msg.clone(),
            ),
            AppError::InsufficientData { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "INSUFFICIENT_DATA",
                self.to_string(),
            ),
            AppError::Render(msg) => {
                tracing::error!("Render error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "RENDER_ERROR",
                    "A rendering error occurred".to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_data_names_the_shortfall() {
        let err = AppError::InsufficientData {
            difficulty: "medium",
            problem_type: "fractions",
            requested: 8,
            available: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("medium"));
        assert!(msg.contains("fractions"));
        assert!(msg.contains("requested 8"));
        assert!(msg.contains("available 3"));
    }

    #[test]
    fn test_validation_error_preserves_message() {
        let err = AppError::Validation("problem 3: unbalanced parentheses".to_string());
        assert!(err.to_string().contains("problem 3"));
    }
}
