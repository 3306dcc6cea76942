use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::error;

#[derive(Debug, ThisError)]
pub enum BiolinkError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid password")]
    InvalidPassword,

    #[error("Authentication required")]
    Unauthorized,

    #[error("Too many login attempts")]
    RateLimited,

    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Upstream error with status: {0}")]
    UpstreamStatus(StatusCode),

    #[error("Image error: {0}")]
    Image(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<image::ImageError> for BiolinkError {
    fn from(e: image::ImageError) -> Self {
        BiolinkError::Image(e.to_string())
    }
}

impl IntoResponse for BiolinkError {
    fn into_response(self) -> axum::response::Response {
        let (status, code, message) = match &self {
            BiolinkError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION", msg.clone())
            }
            BiolinkError::JsonError(_) => (
                StatusCode::BAD_REQUEST,
                "MALFORMED_PAYLOAD",
                "Malformed request body.".to_string(),
            ),
            BiolinkError::Image(msg) => (StatusCode::BAD_REQUEST, "BAD_IMAGE", msg.clone()),
            BiolinkError::InvalidPassword => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Invalid password".to_string(),
            ),
            BiolinkError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required.".to_string(),
            ),
            BiolinkError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMIT",
                "Too many login attempts; try again shortly.".to_string(),
            ),
            BiolinkError::Config(msg) => {
                error!(error = %msg, "configuration error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred.".to_string(),
                )
            }
            BiolinkError::DatabaseError(e) => {
                error!(error = %e, "database operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred.".to_string(),
                )
            }
            BiolinkError::UrlParse(e) => {
                (StatusCode::BAD_REQUEST, "INVALID_URL", format!("Invalid URL: {e}"))
            }
            BiolinkError::Reqwest(_) => (
                StatusCode::BAD_GATEWAY,
                "BAD_GATEWAY",
                "Upstream service is unavailable.".to_string(),
            ),
            BiolinkError::UpstreamStatus(upstream) => {
                let msg = match *upstream {
                    StatusCode::NOT_FOUND => "Upstream resource not found.",
                    StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED => {
                        "Upstream permission denied."
                    }
                    _ => "An upstream error occurred.",
                };
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", msg.to_string())
            }
        };
        (
            status,
            Json(ApiErrorResponse {
                error: message,
                code: code.to_string(),
            }),
        )
            .into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: String,
    pub code: String,
}
