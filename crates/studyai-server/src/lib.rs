//! StudyAI Server
//!
//! HTTP API over the artifact store, plus the configuration it starts from.

pub mod api;
pub mod config;

use std::future::Future;
use std::sync::Arc;

use studyai_core::{PlaceholderGenerator, Result};
use studyai_store::SqliteArtifactStore;
use tokio::net::TcpListener;

pub use api::{
    create_router, AppState, ErrorResponse, FlashcardGenerateRequest, HealthResponse,
    QuizGenerateRequest, StudyGuideGenerateRequest,
};
pub use config::{Config, CONFIG_FILE_NAME};

/// Opens the configured database and applies migrations.
pub async fn open_store(config: &Config) -> Result<SqliteArtifactStore> {
    let generator = PlaceholderGenerator::new().with_flashcard_count(config.flashcard_count);
    let store = SqliteArtifactStore::connect(&config.database_url, Arc::new(generator)).await?;
    store.run_migrations().await?;
    Ok(store)
}

/// Builds the application state for `config`.
pub async fn build_state(config: &Config) -> Result<AppState> {
    let store = open_store(config).await?;
    Ok(AppState::new(Arc::new(store)))
}

/// Serves the API on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "StudyAI API listening");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("StudyAI API stopped");
    Ok(())
}
