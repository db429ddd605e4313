use axum::{Json, extract::State};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::db::NewItem;
use crate::error::LostFoundError;
use crate::middleware::{LostSubmission, SavedImage, parse_attributes};
use crate::router::LostFoundState;

pub const SUBMITTED_MESSAGE: &str = "Lost item submitted!";

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub message: String,
}

/// POST /lost -> store one lost item; attributes come from the client or the vision model.
pub async fn submit_lost_handler(
    State(state): State<LostFoundState>,
    submission: LostSubmission,
) -> Result<Json<SubmitResponse>, LostFoundError> {
    let LostSubmission {
        description,
        attributes,
        image,
    } = submission;

    let attributes = match (attributes, image.as_ref()) {
        (Some(value), _) => Some(value),
        (None, Some(saved)) => generate_attributes(&state, saved).await,
        (None, None) => None,
    };

    let image_path = image.map(|saved| saved.public_path);
    let item = state
        .storage
        .insert(NewItem::lost(description, attributes, image_path))
        .await
        // an already written image stays on disk unreferenced
        .inspect_err(|e| error!(error = %e, "failed to save item"))?;

    info!(
        id = item.id,
        image = ?item.image_path,
        has_attributes = item.attributes.is_some(),
        "lost item stored"
    );
    Ok(Json(SubmitResponse {
        message: SUBMITTED_MESSAGE.to_string(),
    }))
}

/// Best effort: any failure here leaves the item without attributes.
async fn generate_attributes(state: &LostFoundState, saved: &SavedImage) -> Option<Value> {
    let generator = state.generator.as_ref()?;

    let image = match tokio::fs::read(&saved.path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(path = %saved.path.display(), error = %e, "cannot read upload for attributes");
            return None;
        }
    };

    let text = match generator.generate(&image).await {
        Ok(text) => text,
        Err(e) => {
            warn!(image = %saved.name, error = %e, "attribute generation failed; storing without");
            return None;
        }
    };

    match parse_attributes(&text) {
        Ok(value) => value,
        Err(e) => {
            warn!(image = %saved.name, error = %e, "model returned invalid JSON; storing without");
            None
        }
    }
}
