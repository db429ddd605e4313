use axum::{
    Json,
    http::{StatusCode, header},
    response::IntoResponse,
};
use axum::extract::multipart::MultipartError;
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum LostFoundError {
    #[error("form parse error: {0}")]
    FormParse(String),

    #[error("attributes are not valid JSON: {0}")]
    InvalidAttributes(#[source] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Upstream error with status: {0}")]
    UpstreamStatus(StatusCode),

    #[error("attribute generation failed: {0}")]
    Generation(String),

    #[error("failed to store item: {0}")]
    StorageWrite(#[source] SqlxError),

    #[error("failed to query items: {0}")]
    StorageRead(#[source] SqlxError),

    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    #[error("failed to write upload: {0}")]
    FileWrite(#[source] std::io::Error),

    #[error("not found: {0}")]
    NotFound(String),
}

impl LostFoundError {
    /// Errors raised while talking to the vision model. The upload path tolerates these.
    pub fn is_generation(&self) -> bool {
        matches!(
            self,
            LostFoundError::Generation(_)
                | LostFoundError::Reqwest(_)
                | LostFoundError::UpstreamStatus(_)
                | LostFoundError::UrlParse(_)
        )
    }
}

impl From<MultipartError> for LostFoundError {
    fn from(e: MultipartError) -> Self {
        LostFoundError::FormParse(e.body_text())
    }
}

impl IntoResponse for LostFoundError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            LostFoundError::NotFound(_) => {
                return (
                    StatusCode::NOT_FOUND,
                    [(header::CONTENT_TYPE, "text/plain")],
                    "File not found",
                )
                    .into_response();
            }
            LostFoundError::FormParse(_) | LostFoundError::InvalidAttributes(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Error parsing form")
            }
            LostFoundError::FileWrite(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Error saving image"),
            LostFoundError::StorageWrite(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Error saving item")
            }
            LostFoundError::StorageRead(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Error searching"),
            LostFoundError::Database(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            LostFoundError::Generation(_)
            | LostFoundError::Reqwest(_)
            | LostFoundError::UpstreamStatus(_)
            | LostFoundError::UrlParse(_) => {
                (StatusCode::BAD_GATEWAY, "Attribute generation failed")
            }
        };
        (
            status,
            Json(ApiErrorResponse {
                error: message.to_string(),
            }),
        )
            .into_response()
    }
}

/// Error body shared by every JSON endpoint: `{"error": "..."}`.
#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: String,
}
