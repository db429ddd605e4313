use lostfound::db::ItemsStorage;
use lostfound::{AttributeGenerator, LostFoundState, OllamaAttributeGenerator, UploadStore};
use mimalloc::MiMalloc;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = &lostfound::config::CONFIG;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.database_url,
        upload_dir = %cfg.upload_dir.display(),
        ollama_url = %cfg.ollama_url,
        model = %cfg.model,
        generate_attributes = cfg.generate_attributes,
        loglevel = %cfg.loglevel
    );

    let storage = ItemsStorage::connect(&cfg.database_url).await?;
    if cfg.reset_on_start {
        warn!("reset_on_start is set; dropping all stored items");
        storage.reset().await?;
    }

    let uploads = UploadStore::new(cfg.upload_dir.clone());
    uploads.ensure_dir().await?;

    let generator: Option<Arc<dyn AttributeGenerator>> = if cfg.generate_attributes {
        Some(Arc::new(OllamaAttributeGenerator::from_config(cfg)?))
    } else {
        info!("server-side attribute generation disabled");
        None
    };

    let state =
        LostFoundState::new(storage, uploads, generator).with_body_limit(cfg.max_upload_bytes);
    let app = lostfound::lostfound_router(state);

    let listener = TcpListener::bind(cfg.listen_addr.as_str()).await?;
    info!("HTTP server listening on {}", cfg.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
    }
    info!("shutting down");
}
