//! Async session controller.
//!
//! [`SessionController`] drives one [`SessionState`] on behalf of a front
//! end. It awaits generation without holding the state lock, owns the
//! practice-test countdown, and publishes a [`SessionEvent`] for every
//! change.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::artifact::{Artifact, ArtifactKind};
use crate::countdown::Countdown;
use crate::error::{Result, StudyError};
use crate::events::{EventBroadcaster, SessionEvent};
use crate::request::GenerationRequest;
use crate::scoring::ScoreReport;
use crate::session::{GenerationToken, Phase, SessionSnapshot, SessionState};
use crate::source::ArtifactSource;

/// Drives one tool session.
pub struct SessionController {
    state: Arc<Mutex<SessionState>>,
    source: Arc<dyn ArtifactSource>,
    events: EventBroadcaster,
    countdown: Mutex<Option<Countdown>>,
}

impl SessionController {
    /// Creates an idle controller for one tool.
    #[must_use]
    pub fn new(kind: ArtifactKind, source: Arc<dyn ArtifactSource>) -> Self {
        Self::with_events(kind, source, EventBroadcaster::default())
    }

    /// Creates a controller that publishes on an existing broadcaster.
    #[must_use]
    pub fn with_events(
        kind: ArtifactKind,
        source: Arc<dyn ArtifactSource>,
        events: EventBroadcaster,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionState::new(kind))),
            source,
            events,
            countdown: Mutex::new(None),
        }
    }

    /// Subscribes to session events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Current phase.
    pub async fn phase(&self) -> Phase {
        self.state.lock().await.phase()
    }

    /// A copy of the session for rendering.
    pub async fn snapshot(&self) -> SessionSnapshot {
        self.state.lock().await.snapshot()
    }

    // ========================================================================
    // Generation
    // ========================================================================

    /// Submits a request and waits for generation.
    ///
    /// Returns `Ok(None)` if the session was reset while generation was in
    /// flight; the late result is discarded.
    pub async fn submit(&self, request: GenerationRequest) -> Result<Option<Artifact>> {
        let kind = request.kind();
        let token = {
            let mut state = self.state.lock().await;
            state.submit(request.clone()).inspect_err(|e| {
                debug!(kind = kind.as_str(), error = %e, "Submit rejected");
            })?
        };
        info!(kind = kind.as_str(), subject = %request.subject(), "Generation requested");
        self.emit_phase(Phase::Idle, Phase::Pending);

        let source = Arc::clone(&self.source);
        self.complete_pending(token, async move { source.generate(&request).await })
            .await
    }

    /// Loads a persisted artifact into the session.
    ///
    /// A missing id returns the session to `Idle` with nothing attached.
    pub async fn open(&self, id: Uuid) -> Result<Option<Artifact>> {
        let (kind, token) = {
            let mut state = self.state.lock().await;
            let token = state.begin_open()?;
            (state.kind(), token)
        };
        info!(kind = kind.as_str(), %id, "Opening stored artifact");
        self.emit_phase(Phase::Idle, Phase::Pending);

        let source = Arc::clone(&self.source);
        self.complete_pending(token, async move { source.fetch(kind, id).await })
            .await
    }

    async fn complete_pending<F>(&self, token: GenerationToken, work: F) -> Result<Option<Artifact>>
    where
        F: Future<Output = Result<Artifact>> + Send,
    {
        let outcome = work.await;

        let mut state = self.state.lock().await;
        match outcome {
            Ok(artifact) => match state.resolve(token, artifact.clone()) {
                Ok(true) => {
                    info!(id = %artifact.id, title = %artifact.title, "Artifact ready");
                    drop(state);
                    self.emit_phase(Phase::Pending, Phase::Ready);
                    Ok(Some(artifact))
                }
                Ok(false) => {
                    debug!(id = %artifact.id, "Discarding stale generation result");
                    drop(state);
                    self.events.send(SessionEvent::StaleResultDiscarded);
                    Ok(None)
                }
                Err(e) => {
                    warn!(error = %e, "Generated artifact rejected");
                    drop(state);
                    self.emit_failure(&e);
                    Err(e)
                }
            },
            Err(e) => {
                if state.fail(token, &e) {
                    warn!(error = %e, transient = e.is_transient(), "Generation failed");
                    drop(state);
                    self.emit_failure(&e);
                    Err(e)
                } else {
                    debug!(error = %e, "Ignoring failure from stale generation");
                    drop(state);
                    self.events.send(SessionEvent::StaleResultDiscarded);
                    Ok(None)
                }
            }
        }
    }

    // ========================================================================
    // Review
    // ========================================================================

    /// Begins review, arming the countdown for timed artifacts.
    pub async fn start(&self) -> Result<()> {
        let (limit, token) = {
            let mut state = self.state.lock().await;
            let limit = state.start()?;
            (limit, state.token())
        };
        self.emit_phase(Phase::Ready, Phase::Reviewing);

        if let Some(secs) = limit {
            info!(seconds = secs, "Starting countdown");
            let countdown = Countdown::spawn(Arc::clone(&self.state), token, self.events.clone());
            *self.countdown.lock().await = Some(countdown);
            self.events.send(SessionEvent::tick(secs));
        }
        Ok(())
    }

    /// Records or overwrites an answer.
    pub async fn record_answer(&self, question_id: u32, value: impl Into<String>) -> Result<()> {
        let mut state = self.state.lock().await;
        let before = state.phase();
        state
            .record_answer(question_id, value)
            .inspect_err(|e| debug!(question_id, error = %e, "Answer rejected"))?;
        let answered = state.answers().len();
        let after = state.phase();
        drop(state);

        if before != after {
            self.emit_phase(before, after);
        }
        self.events
            .send(SessionEvent::answer_recorded(question_id, answered));
        Ok(())
    }

    /// Records an answer for the question under the cursor.
    pub async fn answer_current(&self, value: impl Into<String>) -> Result<u32> {
        let question_id = {
            let state = self.state.lock().await;
            state
                .artifact()
                .and_then(|a| a.question_id_at(state.cursor().index()))
                .ok_or_else(|| StudyError::validation("answer", "there is no question to answer"))?
        };
        self.record_answer(question_id, value).await?;
        Ok(question_id)
    }

    /// Submits the answers and completes the session.
    ///
    /// Returns the score for kinds with questions.
    pub async fn finish(&self) -> Result<Option<ScoreReport>> {
        let (before, report) = {
            let mut state = self.state.lock().await;
            let before = state.phase();
            state.finish()?;
            (before, state.score())
        };
        self.cancel_countdown().await;

        if let Some(report) = &report {
            info!(
                correct = report.correct,
                total = report.total,
                percent = report.percent,
                "Session submitted"
            );
        }
        self.emit_phase(before, Phase::Completed);
        Ok(report)
    }

    /// Discards the session and returns to `Idle`.
    ///
    /// Any generation in flight is abandoned and the countdown is stopped.
    pub async fn reset(&self) {
        self.cancel_countdown().await;
        let (before, changed) = {
            let mut state = self.state.lock().await;
            let before = state.phase();
            (before, state.reset())
        };
        if changed {
            info!(from = %before, "Session reset");
            self.emit_phase(before, Phase::Idle);
        }
    }

    /// Clears the current notice.
    pub async fn dismiss_notice(&self) {
        self.state.lock().await.dismiss_notice();
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Moves to the next item.
    pub async fn next(&self) -> Result<usize> {
        self.navigate(SessionState::next).await
    }

    /// Moves to the previous item.
    pub async fn prev(&self) -> Result<usize> {
        self.navigate(SessionState::prev).await
    }

    /// Jumps to an item.
    pub async fn jump(&self, index: usize) -> Result<usize> {
        self.navigate(|s| s.jump(index)).await
    }

    async fn navigate(
        &self,
        step: impl FnOnce(&mut SessionState) -> Result<usize> + Send,
    ) -> Result<usize> {
        let mut state = self.state.lock().await;
        let index = step(&mut state)?;
        drop(state);
        self.events.send(SessionEvent::navigated(index, false));
        Ok(index)
    }

    /// Turns the current flashcard over.
    pub async fn flip(&self) -> Result<bool> {
        let mut state = self.state.lock().await;
        let flipped = state.flip()?;
        let index = state.cursor().index();
        drop(state);
        self.events.send(SessionEvent::navigated(index, flipped));
        Ok(flipped)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn cancel_countdown(&self) {
        if let Some(countdown) = self.countdown.lock().await.take() {
            debug!("Cancelling countdown");
            countdown.cancel();
        }
    }

    fn emit_phase(&self, from: Phase, to: Phase) {
        debug!(%from, %to, "Phase changed");
        self.events.send(SessionEvent::phase_changed(from, to));
    }

    fn emit_failure(&self, error: &StudyError) {
        self.events.send(SessionEvent::error(error.user_message()));
        self.emit_phase(Phase::Pending, Phase::Idle);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::*;
    use crate::generator::PlaceholderGenerator;
    use crate::request::RequestOptions;
    use crate::session::CompletionReason;
    use crate::source::InSessionSource;

    fn placeholder() -> Arc<dyn ArtifactSource> {
        Arc::new(InSessionSource::new(Arc::new(PlaceholderGenerator::new())))
    }

    fn request(kind: ArtifactKind) -> GenerationRequest {
        GenerationRequest::new("photosynthesis", RequestOptions::defaults_for(kind))
    }

    /// Source that blocks until released, then generates or fails.
    struct GatedSource {
        gate: Arc<Notify>,
        fail: bool,
    }

    #[async_trait]
    impl ArtifactSource for GatedSource {
        async fn generate(&self, request: &GenerationRequest) -> Result<Artifact> {
            self.gate.notified().await;
            if self.fail {
                return Err(StudyError::generation("model offline"));
            }
            Ok(PlaceholderGenerator::new().draft(request).into_artifact())
        }
    }

    fn gated(fail: bool) -> (Arc<Notify>, Arc<SessionController>) {
        let gate = Arc::new(Notify::new());
        let source = Arc::new(GatedSource {
            gate: Arc::clone(&gate),
            fail,
        });
        let controller = Arc::new(SessionController::new(ArtifactKind::Quiz, source));
        (gate, controller)
    }

    async fn wait_for_phase(controller: &SessionController, phase: Phase) {
        for _ in 0..100 {
            if controller.phase().await == phase {
                return;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(controller.phase().await, phase);
    }

    // ------------------------------------------------------------------------
    // Generation
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_submit_resolves_to_ready() {
        let controller = SessionController::new(ArtifactKind::Quiz, placeholder());
        let mut rx = controller.subscribe();

        let artifact = controller
            .submit(request(ArtifactKind::Quiz))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(artifact.kind(), ArtifactKind::Quiz);
        assert_eq!(controller.phase().await, Phase::Ready);
        assert_eq!(
            rx.recv().await.unwrap(),
            SessionEvent::phase_changed(Phase::Idle, Phase::Pending)
        );
        assert_eq!(
            rx.recv().await.unwrap(),
            SessionEvent::phase_changed(Phase::Pending, Phase::Ready)
        );
    }

    #[tokio::test]
    async fn test_blank_submit_emits_nothing() {
        let controller = SessionController::new(ArtifactKind::Quiz, placeholder());
        let mut rx = controller.subscribe();

        let result = controller
            .submit(GenerationRequest::new(
                "   ",
                RequestOptions::defaults_for(ArtifactKind::Quiz),
            ))
            .await;

        assert!(matches!(result, Err(StudyError::Validation { .. })));
        assert_eq!(controller.phase().await, Phase::Idle);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_generation_failure_returns_to_idle_with_notice() {
        let (gate, controller) = gated(true);
        let task = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.submit(request(ArtifactKind::Quiz)).await })
        };
        wait_for_phase(&controller, Phase::Pending).await;
        gate.notify_one();

        let result = task.await.unwrap();
        assert!(matches!(result, Err(StudyError::GenerationFailure { .. })));
        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.phase, Phase::Idle);
        assert_eq!(snapshot.notice.as_deref(), Some("Generation failed: model offline"));

        controller.dismiss_notice().await;
        assert!(controller.snapshot().await.notice.is_none());
    }

    #[tokio::test]
    async fn test_reset_during_generation_discards_result() {
        let (gate, controller) = gated(false);
        let task = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.submit(request(ArtifactKind::Quiz)).await })
        };
        wait_for_phase(&controller, Phase::Pending).await;

        controller.reset().await;
        gate.notify_one();

        assert!(task.await.unwrap().unwrap().is_none());
        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.phase, Phase::Idle);
        assert!(snapshot.artifact.is_none());
    }

    #[tokio::test]
    async fn test_open_missing_id_leaves_no_partial_state() {
        let controller = SessionController::new(ArtifactKind::Quiz, placeholder());
        let result = controller.open(Uuid::new_v4()).await;

        assert!(matches!(result, Err(StudyError::NotFound { .. })));
        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.phase, Phase::Idle);
        assert!(snapshot.artifact.is_none());
        assert!(snapshot.answers.is_empty());
    }

    // ------------------------------------------------------------------------
    // Review
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_quiz_answer_implicitly_starts_review() {
        let controller = SessionController::new(ArtifactKind::Quiz, placeholder());
        controller.submit(request(ArtifactKind::Quiz)).await.unwrap();

        controller.record_answer(1, "Option A").await.unwrap();
        assert_eq!(controller.phase().await, Phase::Reviewing);

        let report = controller.finish().await.unwrap().unwrap();
        assert_eq!(report.correct, 1);
        assert_eq!(report.total, 10);
        assert_eq!(report.percent, 10);
    }

    #[tokio::test]
    async fn test_flashcards_navigation_and_flip() {
        let controller = SessionController::new(ArtifactKind::FlashcardSet, placeholder());
        controller
            .submit(request(ArtifactKind::FlashcardSet))
            .await
            .unwrap();

        assert_eq!(controller.prev().await.unwrap(), 9);
        assert!(controller.flip().await.unwrap());
        assert_eq!(controller.next().await.unwrap(), 0);
        assert!(!controller.snapshot().await.flipped);
        assert_eq!(controller.jump(4).await.unwrap(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_practice_test_expiry_locks_answers() {
        let controller = SessionController::new(ArtifactKind::PracticeTest, placeholder());
        controller
            .submit(GenerationRequest::new(
                "biology",
                RequestOptions::PracticeTest {
                    time_limit_minutes: 1,
                    num_questions: 3,
                },
            ))
            .await
            .unwrap();

        let early = controller.record_answer(1, "Option A").await;
        assert!(matches!(early, Err(StudyError::TestNotStarted)));

        controller.start().await.unwrap();
        controller.record_answer(1, "Option A").await.unwrap();

        tokio::time::sleep(Duration::from_secs(61)).await;

        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.phase, Phase::Completed);
        assert_eq!(snapshot.completion, Some(CompletionReason::TimeExpired));
        assert_eq!(snapshot.score.as_ref().map(|s| s.correct), Some(1));

        let late = controller.record_answer(2, "Option A").await;
        assert!(matches!(late, Err(StudyError::AnswersLocked)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_finish_stops_countdown() {
        let controller = SessionController::new(ArtifactKind::PracticeTest, placeholder());
        controller
            .submit(request(ArtifactKind::PracticeTest))
            .await
            .unwrap();
        controller.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(10_500)).await;

        controller.finish().await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;

        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.remaining_secs, Some(1790));
        assert_eq!(snapshot.completion, Some(CompletionReason::Submitted));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_clears_timer_and_state() {
        let controller = SessionController::new(ArtifactKind::PracticeTest, placeholder());
        controller
            .submit(request(ArtifactKind::PracticeTest))
            .await
            .unwrap();
        controller.start().await.unwrap();
        controller.record_answer(1, "Option B").await.unwrap();

        controller.reset().await;
        tokio::time::sleep(Duration::from_secs(5)).await;

        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.phase, Phase::Idle);
        assert!(snapshot.artifact.is_none());
        assert!(snapshot.answers.is_empty());
        assert!(snapshot.remaining_secs.is_none());
        assert_eq!(snapshot.index, 0);
    }
}
