use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use tracing::{debug, error};

use crate::db::Item;
use crate::error::LostFoundError;
use crate::router::LostFoundState;

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub description: String,
}

/// GET /search?description=... -> every `lost` item whose description contains the text.
pub async fn search_handler(
    State(state): State<LostFoundState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Item>>, LostFoundError> {
    let items = state
        .storage
        .search_lost(&query.description)
        .await
        .inspect_err(|e| error!(error = %e, "search failed"))?;
    debug!(query = %query.description, hits = items.len(), "search");
    Ok(Json(items))
}
