//! StudyAI Store
//!
//! SQLite implementation of the [`ArtifactStore`] port. Each artifact is one
//! row whose body column holds the kind-specific content as a JSON document.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, SqlitePool};
use studyai_core::{
    Artifact, ArtifactBody, ArtifactKind, ArtifactStore, ContentGenerator, GenerationRequest,
    Result, StudyError,
};
use tracing::{debug, info};
use uuid::Uuid;

/// Pool size used for file-backed databases.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

// ============================================================================
// Store
// ============================================================================

/// Artifact store backed by a SQLite database.
#[derive(Clone)]
pub struct SqliteArtifactStore {
    pool: SqlitePool,
    generator: Arc<dyn ContentGenerator>,
}

impl SqliteArtifactStore {
    /// Creates a store over an existing pool.
    #[must_use]
    pub fn new(pool: SqlitePool, generator: Arc<dyn ContentGenerator>) -> Self {
        Self { pool, generator }
    }

    /// Opens a pool for `database_url`, creating the database file if needed.
    ///
    /// In-memory URLs get a single connection so every query sees the same
    /// database.
    pub async fn connect(database_url: &str, generator: Arc<dyn ContentGenerator>) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(persistence)?
            .create_if_missing(true);
        let max_connections = if database_url.contains(":memory:") {
            1
        } else {
            DEFAULT_MAX_CONNECTIONS
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(persistence)?;
        info!(database_url, max_connections, "Connected to artifact database");

        Ok(Self::new(pool, generator))
    }

    /// Runs embedded migrations. Call once at startup.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StudyError::persistence(format!("migration failed: {e}")))?;
        Ok(())
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn insert(&self, artifact: &Artifact) -> Result<()> {
        let body = serde_json::to_string(&artifact.body)?;
        sqlx::query(
            "INSERT INTO artifacts (id, kind, title, body, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(artifact.id.to_string())
        .bind(artifact.kind().as_str())
        .bind(&artifact.title)
        .bind(body)
        .bind(artifact.created_at)
        .execute(&self.pool)
        .await
        .map_err(persistence)?;
        Ok(())
    }
}

fn persistence(e: sqlx::Error) -> StudyError {
    StudyError::persistence(e.to_string())
}

// ============================================================================
// Records
// ============================================================================

#[derive(FromRow)]
struct ArtifactRecord {
    id: String,
    title: String,
    body: String,
    created_at: DateTime<Utc>,
}

impl ArtifactRecord {
    fn to_domain(self) -> Result<Artifact> {
        let id = Uuid::parse_str(&self.id).map_err(|e| {
            StudyError::persistence(format!("corrupt artifact id '{}': {e}", self.id))
        })?;
        let body: ArtifactBody = serde_json::from_str(&self.body)
            .map_err(|e| StudyError::persistence(format!("corrupt body for artifact {id}: {e}")))?;
        Ok(Artifact {
            id,
            title: self.title,
            created_at: self.created_at,
            body,
        })
    }
}

// ============================================================================
// ArtifactStore Implementation
// ============================================================================

#[async_trait]
impl ArtifactStore for SqliteArtifactStore {
    async fn create_artifact(&self, request: &GenerationRequest) -> Result<Artifact> {
        let kind = request.kind();
        if !kind.is_persisted() {
            return Err(StudyError::validation(
                "kind",
                format!("{} artifacts are not stored", kind.as_str()),
            ));
        }
        request.validate()?;

        let artifact = self.generator.generate(request).await?.into_artifact();
        if artifact.kind() != kind {
            return Err(StudyError::generation(format!(
                "generator returned a {} for a {} request",
                artifact.kind().as_str(),
                kind.as_str()
            )));
        }
        artifact.validate()?;

        self.insert(&artifact).await?;
        info!(id = %artifact.id, kind = kind.as_str(), "Artifact stored");
        Ok(artifact)
    }

    async fn get_artifact(&self, kind: ArtifactKind, id: Uuid) -> Result<Artifact> {
        debug!(%id, kind = kind.as_str(), "Loading artifact");
        let record = sqlx::query_as::<_, ArtifactRecord>(
            "SELECT id, title, body, created_at FROM artifacts WHERE id = ?1 AND kind = ?2",
        )
        .bind(id.to_string())
        .bind(kind.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(persistence)?
        .ok_or_else(|| StudyError::not_found(kind, id))?;

        record.to_domain()
    }
}
