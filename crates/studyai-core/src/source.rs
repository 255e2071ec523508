//! Where a session gets its artifacts from.
//!
//! Quizzes, flashcard sets, and study guides are persisted through the
//! [`ArtifactStore`]; practice tests, essays, and concept explanations are
//! generated in-session and never stored. [`PersistingSource`] routes each
//! request accordingly.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::artifact::{Artifact, ArtifactKind};
use crate::error::{Result, StudyError};
use crate::generator::ContentGenerator;
use crate::request::GenerationRequest;
use crate::store::ArtifactStore;

/// Produces and loads artifacts for a session.
#[async_trait]
pub trait ArtifactSource: Send + Sync {
    /// Produces a new artifact for `request`.
    async fn generate(&self, request: &GenerationRequest) -> Result<Artifact>;

    /// Loads a previously persisted artifact.
    async fn fetch(&self, kind: ArtifactKind, id: Uuid) -> Result<Artifact> {
        Err(StudyError::not_found(kind, id))
    }
}

/// Source that generates everything in memory and persists nothing.
pub struct InSessionSource {
    generator: Arc<dyn ContentGenerator>,
}

impl InSessionSource {
    /// Wraps a generator.
    #[must_use]
    pub fn new(generator: Arc<dyn ContentGenerator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl ArtifactSource for InSessionSource {
    async fn generate(&self, request: &GenerationRequest) -> Result<Artifact> {
        let draft = self.generator.generate(request).await?;
        Ok(draft.into_artifact())
    }
}

/// Source that persists the kinds the store accepts and generates the rest
/// in-session.
pub struct PersistingSource {
    store: Arc<dyn ArtifactStore>,
    in_session: InSessionSource,
}

impl PersistingSource {
    /// Creates a source over a store and a generator for unpersisted kinds.
    #[must_use]
    pub fn new(store: Arc<dyn ArtifactStore>, generator: Arc<dyn ContentGenerator>) -> Self {
        Self {
            store,
            in_session: InSessionSource::new(generator),
        }
    }
}

#[async_trait]
impl ArtifactSource for PersistingSource {
    async fn generate(&self, request: &GenerationRequest) -> Result<Artifact> {
        let kind = request.kind();
        if kind.is_persisted() {
            debug!(kind = kind.as_str(), "generating through artifact store");
            self.store.create_artifact(request).await
        } else {
            debug!(kind = kind.as_str(), "generating in-session");
            self.in_session.generate(request).await
        }
    }

    async fn fetch(&self, kind: ArtifactKind, id: Uuid) -> Result<Artifact> {
        if !kind.is_persisted() {
            return Err(StudyError::not_found(kind, id));
        }
        self.store.get_artifact(kind, id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;
    use crate::generator::PlaceholderGenerator;
    use crate::request::RequestOptions;

    #[derive(Default)]
    struct MemoryStore {
        artifacts: Mutex<HashMap<Uuid, Artifact>>,
    }

    #[async_trait]
    impl ArtifactStore for MemoryStore {
        async fn create_artifact(&self, request: &GenerationRequest) -> Result<Artifact> {
            let artifact = PlaceholderGenerator::new().draft(request).into_artifact();
            self.artifacts
                .lock()
                .unwrap()
                .insert(artifact.id, artifact.clone());
            Ok(artifact)
        }

        async fn get_artifact(&self, kind: ArtifactKind, id: Uuid) -> Result<Artifact> {
            self.artifacts
                .lock()
                .unwrap()
                .get(&id)
                .filter(|a| a.kind() == kind)
                .cloned()
                .ok_or_else(|| StudyError::not_found(kind, id))
        }
    }

    fn source() -> (Arc<MemoryStore>, PersistingSource) {
        let store = Arc::new(MemoryStore::default());
        let source = PersistingSource::new(store.clone(), Arc::new(PlaceholderGenerator::new()));
        (store, source)
    }

    #[tokio::test]
    async fn test_persisted_kinds_go_to_store() {
        let (store, source) = source();
        for kind in [
            ArtifactKind::Quiz,
            ArtifactKind::FlashcardSet,
            ArtifactKind::StudyGuide,
        ] {
            let request = GenerationRequest::new("ions", RequestOptions::defaults_for(kind));
            let artifact = source.generate(&request).await.unwrap();
            assert_eq!(source.fetch(kind, artifact.id).await.unwrap(), artifact);
        }
        assert_eq!(store.artifacts.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_in_session_kinds_are_not_stored() {
        let (store, source) = source();
        for kind in [
            ArtifactKind::PracticeTest,
            ArtifactKind::Essay,
            ArtifactKind::ConceptExplanation,
        ] {
            let request = GenerationRequest::new("ions", RequestOptions::defaults_for(kind));
            let artifact = source.generate(&request).await.unwrap();
            let err = source.fetch(kind, artifact.id).await.unwrap_err();
            assert!(matches!(err, StudyError::NotFound { .. }));
        }
        assert!(store.artifacts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_in_session_source_cannot_fetch() {
        let source = InSessionSource::new(Arc::new(PlaceholderGenerator::new()));
        let err = source
            .fetch(ArtifactKind::Quiz, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, StudyError::NotFound { .. }));
    }
}
