//! Artifact persistence port.
//!
//! Implementations generate the artifact body through a
//! [`ContentGenerator`](crate::ContentGenerator) and write it to a document
//! store. Only create and read are supported; artifacts are immutable.

use async_trait::async_trait;
use uuid::Uuid;

use crate::artifact::{Artifact, ArtifactKind};
use crate::error::Result;
use crate::request::GenerationRequest;

/// Create/read access to persisted artifacts.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Generates an artifact for `request`, assigns it an id, and persists it.
    ///
    /// Fails with `Validation` for bad input, `GenerationFailure` if the
    /// generator fails, and `Persistence` if the write fails.
    async fn create_artifact(&self, request: &GenerationRequest) -> Result<Artifact>;

    /// Loads a persisted artifact of the given kind.
    ///
    /// Fails with `NotFound` when no artifact of that kind has this id.
    async fn get_artifact(&self, kind: ArtifactKind, id: Uuid) -> Result<Artifact>;
}
