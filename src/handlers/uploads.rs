use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};

use crate::error::LostFoundError;
use crate::router::LostFoundState;

const IMAGE_CONTENT_TYPE: &str = "image/jpeg";

/// GET /uploads/{name} -> raw bytes of a stored image.
pub async fn upload_asset_handler(
    State(state): State<LostFoundState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, LostFoundError> {
    let bytes = state.uploads.read(&name).await?;
    Ok(([(header::CONTENT_TYPE, IMAGE_CONTENT_TYPE)], bytes))
}
