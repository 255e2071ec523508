//! End-to-end session tests.
//!
//! These drive a `SessionController` through whole study sessions, using the
//! SQLite store for stored kinds and in-session generation for the rest.

use std::sync::Arc;
use std::time::Duration;

use studyai_core::{
    ArtifactKind, ArtifactSource, ArtifactStore, CompletionReason, GenerationRequest, GradeBand,
    InSessionSource, PersistingSource, Phase, PlaceholderGenerator, QuestionTypeChoice,
    RequestOptions, SessionController, SessionEvent, StudyError,
};
use studyai_store::SqliteArtifactStore;

async fn memory_store() -> Arc<SqliteArtifactStore> {
    let generator = Arc::new(PlaceholderGenerator::new());
    let store = SqliteArtifactStore::connect("sqlite::memory:", generator)
        .await
        .expect("Failed to open store");
    store.run_migrations().await.expect("Failed to migrate");
    Arc::new(store)
}

fn persisting(store: Arc<SqliteArtifactStore>) -> Arc<dyn ArtifactSource> {
    Arc::new(PersistingSource::new(store, Arc::new(PlaceholderGenerator::new())))
}

fn in_session() -> Arc<dyn ArtifactSource> {
    Arc::new(InSessionSource::new(Arc::new(PlaceholderGenerator::new())))
}

fn multiple_choice_quiz(topic: &str, num_questions: u32) -> GenerationRequest {
    GenerationRequest::new(
        topic,
        RequestOptions::Quiz {
            difficulty: studyai_core::Difficulty::Medium,
            question_type: QuestionTypeChoice::MultipleChoice,
            num_questions,
        },
    )
}

// ============================================================================
// Quiz
// ============================================================================

/// Four of five correct answers grade to 80%.
#[tokio::test]
async fn test_quiz_session_scores_eighty_percent() {
    let store = memory_store().await;
    let controller = SessionController::new(ArtifactKind::Quiz, persisting(Arc::clone(&store)));

    let artifact = controller
        .submit(multiple_choice_quiz("cell biology", 5))
        .await
        .expect("submit failed")
        .expect("result discarded");
    assert_eq!(controller.phase().await, Phase::Ready);

    // Stored and retrievable by the same id
    let stored = store
        .get_artifact(ArtifactKind::Quiz, artifact.id)
        .await
        .expect("quiz was not stored");
    assert_eq!(stored.body, artifact.body);

    for answer in ["Option A", "Option A", "Option A", "Option A", "Option C"] {
        controller.answer_current(answer).await.expect("answer failed");
        controller.next().await.expect("next failed");
    }
    assert_eq!(controller.snapshot().await.index, 4, "quiz cursor clamps");

    let report = controller
        .finish()
        .await
        .expect("finish failed")
        .expect("quiz should be graded");
    assert_eq!(report.correct, 4);
    assert_eq!(report.total, 5);
    assert_eq!(report.percent, 80);
    assert_eq!(report.band, GradeBand::Strong);
    assert!(!report.entries[4].is_correct);

    let late = controller.record_answer(5, "Option A").await;
    assert!(matches!(late, Err(StudyError::AnswersLocked)));
}

/// Opening a stored quiz in a fresh session attaches the same artifact.
#[tokio::test]
async fn test_open_stored_quiz_in_new_session() {
    let store = memory_store().await;
    let created = store
        .create_artifact(&multiple_choice_quiz("volcanoes", 3))
        .await
        .expect("create failed");

    let controller = SessionController::new(ArtifactKind::Quiz, persisting(store));
    let opened = controller
        .open(created.id)
        .await
        .expect("open failed")
        .expect("result discarded");
    assert_eq!(opened, created);

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.phase, Phase::Ready);
    assert_eq!(snapshot.item_count, 3);
}

/// A missing id leaves nothing attached.
#[tokio::test]
async fn test_open_missing_id_leaves_session_idle() {
    let controller =
        SessionController::new(ArtifactKind::FlashcardSet, persisting(memory_store().await));

    let err = controller
        .open(uuid::Uuid::new_v4())
        .await
        .expect_err("missing id should fail");
    assert!(matches!(err, StudyError::NotFound { .. }));

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.phase, Phase::Idle);
    assert!(snapshot.artifact.is_none());
    assert!(snapshot.answers.is_empty());
    assert!(snapshot.notice.is_some());
}

// ============================================================================
// Flashcards
// ============================================================================

#[tokio::test]
async fn test_flashcard_session_wraps_and_flips() {
    let controller =
        SessionController::new(ArtifactKind::FlashcardSet, persisting(memory_store().await));
    let mut events = controller.subscribe();

    controller
        .submit(GenerationRequest::new("enzymes", RequestOptions::FlashcardSet))
        .await
        .expect("submit failed");

    assert!(controller.flip().await.expect("flip failed"));
    assert_eq!(controller.prev().await.expect("prev failed"), 9);
    assert!(!controller.snapshot().await.flipped, "moving resets the flip");
    assert_eq!(controller.next().await.expect("next failed"), 0);

    let mut names = Vec::new();
    while let Ok(event) = events.try_recv() {
        names.push(event.event_name());
    }
    assert_eq!(
        names,
        [
            "phase_changed",
            "phase_changed",
            "navigated",
            "navigated",
            "navigated"
        ]
    );
}

// ============================================================================
// Practice test
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_practice_test_runs_out_of_time() {
    let controller = SessionController::new(ArtifactKind::PracticeTest, in_session());
    let mut events = controller.subscribe();

    controller
        .submit(GenerationRequest::new(
            "genetics",
            RequestOptions::PracticeTest {
                time_limit_minutes: 1,
                num_questions: 4,
            },
        ))
        .await
        .expect("submit failed");
    controller.start().await.expect("start failed");
    controller.answer_current("Option A").await.expect("answer failed");
    controller.jump(2).await.expect("jump failed");
    controller.answer_current("Option B").await.expect("answer failed");

    tokio::time::sleep(Duration::from_secs(65)).await;

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.phase, Phase::Completed);
    assert_eq!(snapshot.completion, Some(CompletionReason::TimeExpired));
    assert_eq!(snapshot.remaining_secs, Some(0));

    let report = snapshot.score.expect("test should be graded");
    assert_eq!(report.correct, 1);
    assert_eq!(report.answered, 2);
    assert_eq!(report.percent, 25);

    let mut saw_expiry = false;
    while let Ok(event) = events.try_recv() {
        if event == SessionEvent::TimeExpired {
            saw_expiry = true;
        }
    }
    assert!(saw_expiry);
}

#[tokio::test(start_paused = true)]
async fn test_reset_mid_test_then_generate_again() {
    let controller = SessionController::new(ArtifactKind::PracticeTest, in_session());
    let request = GenerationRequest::new(
        "genetics",
        RequestOptions::defaults_for(ArtifactKind::PracticeTest),
    );

    controller.submit(request.clone()).await.expect("submit failed");
    controller.start().await.expect("start failed");
    controller.answer_current("Option A").await.expect("answer failed");
    tokio::time::sleep(Duration::from_secs(5)).await;

    controller.reset().await;
    let idle = controller.snapshot().await;
    assert_eq!(idle.phase, Phase::Idle);
    assert!(idle.artifact.is_none());
    assert!(idle.answers.is_empty());
    assert_eq!(idle.remaining_secs, None);

    tokio::time::sleep(Duration::from_secs(5)).await;
    controller.submit(request).await.expect("resubmit failed");
    let fresh = controller.snapshot().await;
    assert_eq!(fresh.phase, Phase::Ready);
    assert!(fresh.answers.is_empty());
    assert_eq!(fresh.remaining_secs, None, "clock waits for start");

    controller.start().await.expect("start failed");
    assert_eq!(controller.snapshot().await.remaining_secs, Some(1800));
}

// ============================================================================
// Unstored kinds
// ============================================================================

#[tokio::test]
async fn test_essay_and_concept_are_generated_in_session() {
    let store = memory_store().await;

    for kind in [ArtifactKind::Essay, ArtifactKind::ConceptExplanation] {
        let controller = SessionController::new(kind, persisting(Arc::clone(&store)));
        let artifact = controller
            .submit(GenerationRequest::new("climate policy", RequestOptions::defaults_for(kind)))
            .await
            .expect("submit failed")
            .expect("result discarded");
        assert_eq!(artifact.kind(), kind);

        let missing = store.get_artifact(kind, artifact.id).await;
        assert!(matches!(missing, Err(StudyError::NotFound { .. })));

        let report = controller.finish().await.expect("finish failed");
        assert!(report.is_none());
        assert_eq!(controller.phase().await, Phase::Completed);
    }
}
