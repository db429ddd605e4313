pub mod lost;
pub mod search;
pub mod uploads;

use axum::http::{StatusCode, header};
use axum::response::IntoResponse;

/// Fallback for every unmatched route.
pub async fn not_found_handler() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "text/plain")],
        "Not Found",
    )
}
