pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod service;
pub mod types;

pub use error::LostFoundError;
pub use router::{LostFoundState, lostfound_router};
pub use service::{AttributeGenerator, OllamaAttributeGenerator, UploadStore};
