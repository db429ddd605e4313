use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{Method, header},
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};

use crate::db::ItemsStorage;
use crate::handlers::{
    lost::submit_lost_handler, not_found_handler, search::search_handler,
    uploads::upload_asset_handler,
};
use crate::service::{AttributeGenerator, UploadStore};

const DEFAULT_BODY_LIMIT: usize = 20 * 1024 * 1024;

/// State shared by every handler. Cheap to clone.
#[derive(Clone)]
pub struct LostFoundState {
    pub storage: ItemsStorage,
    pub uploads: UploadStore,
    /// `None` disables server-side attribute generation.
    pub generator: Option<Arc<dyn AttributeGenerator>>,
    pub max_upload_bytes: usize,
}

impl LostFoundState {
    pub fn new(
        storage: ItemsStorage,
        uploads: UploadStore,
        generator: Option<Arc<dyn AttributeGenerator>>,
    ) -> Self {
        Self {
            storage,
            uploads,
            generator,
            max_upload_bytes: DEFAULT_BODY_LIMIT,
        }
    }

    pub fn with_body_limit(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}

pub fn lostfound_router(state: LostFoundState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route(
            "/lost",
            post(submit_lost_handler).layer(DefaultBodyLimit::max(state.max_upload_bytes)),
        )
        .route("/search", get(search_handler))
        .route("/uploads/{name}", get(upload_asset_handler))
        .fallback(not_found_handler)
        .layer(cors)
        .with_state(state)
}
