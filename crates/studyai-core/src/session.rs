//! Generation-session state machine.
//!
//! [`SessionState`] tracks one study tool's lifecycle: a request is
//! submitted, generation resolves into an artifact, the user reviews it, and
//! the session completes or is reset. It is synchronous and owns no tasks;
//! the async [`SessionController`](crate::SessionController) drives it.
//!
//! Every submission or reset bumps a [`GenerationToken`]. Results and
//! countdown ticks carrying an older token are ignored, so a reset can never
//! be overwritten by work that started before it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::artifact::{Artifact, ArtifactBody, ArtifactKind};
use crate::cursor::{Cursor, CursorPolicy};
use crate::error::{Result, StudyError};
use crate::request::GenerationRequest;
use crate::scoring::{self, ScoreReport};

// ============================================================================
// Phase
// ============================================================================

/// Lifecycle phase of a session.
///
/// The phase transitions through these states:
/// - `Idle` -> `Pending` on submit
/// - `Pending` -> `Ready` when generation resolves, or back to `Idle` on failure
/// - `Ready` -> `Reviewing` on start (or the first answer for untimed kinds)
/// - `Reviewing` -> `Completed` on submit or countdown expiry
/// - any phase -> `Idle` on reset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No request in flight.
    #[default]
    Idle,
    /// Waiting for generation.
    Pending,
    /// An artifact is attached and not yet started.
    Ready,
    /// The user is working through the artifact.
    Reviewing,
    /// Answers are locked and the result is shown.
    Completed,
}

impl Phase {
    /// Returns `true` if an artifact is attached in this phase.
    ///
    /// # Examples
    ///
    /// ```
    /// use studyai_core::Phase;
    ///
    /// assert!(Phase::Ready.has_artifact());
    /// assert!(Phase::Completed.has_artifact());
    /// assert!(!Phase::Pending.has_artifact());
    /// ```
    #[must_use]
    pub const fn has_artifact(&self) -> bool {
        matches!(self, Self::Ready | Self::Reviewing | Self::Completed)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Pending => write!(f, "pending"),
            Self::Ready => write!(f, "ready"),
            Self::Reviewing => write!(f, "reviewing"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// Why a session reached `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionReason {
    /// The user submitted.
    Submitted,
    /// The countdown reached zero.
    TimeExpired,
}

/// Identifies one generation attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenerationToken(u64);

impl GenerationToken {
    const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Result of applying one countdown second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The countdown continues with this many seconds left.
    Running(u64),
    /// The countdown hit zero and the session completed.
    Expired,
    /// The tick belongs to an older generation or no countdown is running.
    Ignored,
}

// ============================================================================
// SessionState
// ============================================================================

/// Ephemeral state of one tool session. Never persisted.
#[derive(Debug, Clone)]
pub struct SessionState {
    kind: ArtifactKind,
    phase: Phase,
    token: GenerationToken,
    request: Option<GenerationRequest>,
    artifact: Option<Artifact>,
    answers: BTreeMap<u32, String>,
    cursor: Cursor,
    flipped: bool,
    remaining_secs: Option<u64>,
    completion: Option<CompletionReason>,
    notice: Option<String>,
}

impl SessionState {
    /// Creates an idle session for one tool.
    #[must_use]
    pub fn new(kind: ArtifactKind) -> Self {
        Self {
            kind,
            phase: Phase::Idle,
            token: GenerationToken::default(),
            request: None,
            artifact: None,
            answers: BTreeMap::new(),
            cursor: Cursor::new(0, CursorPolicy::Clamp),
            flipped: false,
            remaining_secs: None,
            completion: None,
            notice: None,
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// The tool this session belongs to.
    #[must_use]
    pub const fn kind(&self) -> ArtifactKind {
        self.kind
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Token of the current generation.
    #[must_use]
    pub const fn token(&self) -> GenerationToken {
        self.token
    }

    /// The request being served, if any.
    #[must_use]
    pub const fn request(&self) -> Option<&GenerationRequest> {
        self.request.as_ref()
    }

    /// The attached artifact, if any.
    #[must_use]
    pub const fn artifact(&self) -> Option<&Artifact> {
        self.artifact.as_ref()
    }

    /// Recorded answers by question id.
    #[must_use]
    pub const fn answers(&self) -> &BTreeMap<u32, String> {
        &self.answers
    }

    /// Item cursor.
    #[must_use]
    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Whether the current flashcard shows its back.
    #[must_use]
    pub const fn is_flipped(&self) -> bool {
        self.flipped
    }

    /// Seconds left on the countdown, for started timed artifacts.
    #[must_use]
    pub const fn remaining_secs(&self) -> Option<u64> {
        self.remaining_secs
    }

    /// Why the session completed, once it has.
    #[must_use]
    pub const fn completion(&self) -> Option<CompletionReason> {
        self.completion
    }

    /// The last user-visible notice.
    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Clears the notice.
    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    // ------------------------------------------------------------------------
    // Generation
    // ------------------------------------------------------------------------

    /// Accepts a request and enters `Pending`.
    ///
    /// Rejected requests leave the state untouched.
    pub fn submit(&mut self, request: GenerationRequest) -> Result<GenerationToken> {
        self.require(Phase::Idle, Phase::Pending)?;
        if request.kind() != self.kind {
            return Err(StudyError::validation(
                "kind",
                format!(
                    "this session generates {} artifacts, not {}",
                    self.kind.as_str(),
                    request.kind().as_str()
                ),
            ));
        }
        request.validate()?;

        self.request = Some(request);
        Ok(self.enter_pending())
    }

    /// Enters `Pending` to load an existing artifact instead of generating one.
    pub fn begin_open(&mut self) -> Result<GenerationToken> {
        self.require(Phase::Idle, Phase::Pending)?;
        self.request = None;
        Ok(self.enter_pending())
    }

    fn enter_pending(&mut self) -> GenerationToken {
        self.token = self.token.next();
        self.phase = Phase::Pending;
        self.notice = None;
        self.token
    }

    /// Attaches a generated artifact.
    ///
    /// Returns `Ok(false)` without touching anything if `token` is stale. An
    /// artifact of the wrong kind or with a malformed body fails the
    /// generation and returns the session to `Idle`.
    pub fn resolve(&mut self, token: GenerationToken, artifact: Artifact) -> Result<bool> {
        if token != self.token || self.phase != Phase::Pending {
            return Ok(false);
        }

        let checked = if artifact.kind() == self.kind {
            artifact.validate()
        } else {
            Err(StudyError::generation(format!(
                "expected a {} artifact but received a {}",
                self.kind.as_str(),
                artifact.kind().as_str()
            )))
        };
        if let Err(e) = checked {
            self.fail(token, &e);
            return Err(e);
        }

        self.cursor = Cursor::new(
            artifact.navigable_len(),
            self.kind.cursor_policy().unwrap_or(CursorPolicy::Clamp),
        );
        self.artifact = Some(artifact);
        self.answers.clear();
        self.flipped = false;
        self.remaining_secs = None;
        self.completion = None;
        self.phase = Phase::Ready;
        Ok(true)
    }

    /// Abandons the pending generation and surfaces `error` as a notice.
    ///
    /// Returns `false` if `token` is stale.
    pub fn fail(&mut self, token: GenerationToken, error: &StudyError) -> bool {
        if token != self.token || self.phase != Phase::Pending {
            return false;
        }
        self.request = None;
        self.artifact = None;
        self.phase = Phase::Idle;
        self.notice = Some(error.user_message());
        true
    }

    // ------------------------------------------------------------------------
    // Review
    // ------------------------------------------------------------------------

    /// Begins review.
    ///
    /// Returns the countdown length in seconds when the artifact is timed.
    pub fn start(&mut self) -> Result<Option<u64>> {
        self.require(Phase::Ready, Phase::Reviewing)?;
        let limit = self.artifact.as_ref().and_then(Artifact::time_limit_secs);
        self.remaining_secs = limit;
        self.phase = Phase::Reviewing;
        Ok(limit)
    }

    /// Records or overwrites the answer to one question.
    ///
    /// Answering an untimed artifact in `Ready` starts review implicitly.
    pub fn record_answer(&mut self, question_id: u32, value: impl Into<String>) -> Result<()> {
        match self.phase {
            Phase::Reviewing => {}
            Phase::Ready if self.kind.is_timed() => return Err(StudyError::TestNotStarted),
            Phase::Ready => {}
            Phase::Completed => return Err(StudyError::AnswersLocked),
            Phase::Idle | Phase::Pending => {
                return Err(StudyError::invalid_transition(self.phase, Phase::Reviewing));
            }
        }

        let known = self
            .artifact
            .as_ref()
            .is_some_and(|a| a.has_question(question_id));
        if !known {
            return Err(StudyError::UnknownQuestion { id: question_id });
        }

        self.phase = Phase::Reviewing;
        self.answers.insert(question_id, value.into());
        Ok(())
    }

    /// Records an answer for the question under the cursor.
    ///
    /// Returns the id of the answered question.
    pub fn answer_current(&mut self, value: impl Into<String>) -> Result<u32> {
        let id = self
            .artifact
            .as_ref()
            .and_then(|a| a.question_id_at(self.cursor.index()))
            .ok_or_else(|| StudyError::validation("answer", "there is no question to answer"))?;
        self.record_answer(id, value)?;
        Ok(id)
    }

    /// Applies one countdown second.
    pub fn tick(&mut self, token: GenerationToken) -> TickOutcome {
        if token != self.token || self.phase != Phase::Reviewing {
            return TickOutcome::Ignored;
        }
        let Some(remaining) = self.remaining_secs else {
            return TickOutcome::Ignored;
        };

        let remaining = remaining.saturating_sub(1);
        self.remaining_secs = Some(remaining);
        if remaining == 0 {
            self.phase = Phase::Completed;
            self.completion = Some(CompletionReason::TimeExpired);
            TickOutcome::Expired
        } else {
            TickOutcome::Running(remaining)
        }
    }

    /// Completes the session at the user's request.
    ///
    /// Unanswered questions are allowed. Untimed artifacts may be finished
    /// straight from `Ready`.
    pub fn finish(&mut self) -> Result<()> {
        match self.phase {
            Phase::Reviewing => {}
            Phase::Ready if !self.kind.is_timed() => {}
            _ => return Err(StudyError::invalid_transition(self.phase, Phase::Completed)),
        }
        self.phase = Phase::Completed;
        self.completion = Some(CompletionReason::Submitted);
        Ok(())
    }

    /// Discards everything and returns to `Idle`.
    ///
    /// Returns `false` if the session was already idle.
    pub fn reset(&mut self) -> bool {
        if self.phase == Phase::Idle {
            return false;
        }
        *self = Self {
            token: self.token.next(),
            ..Self::new(self.kind)
        };
        true
    }

    // ------------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------------

    /// Moves to the next item.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<usize> {
        self.navigate(Cursor::next)
    }

    /// Moves to the previous item.
    pub fn prev(&mut self) -> Result<usize> {
        self.navigate(Cursor::prev)
    }

    /// Jumps to an item.
    pub fn jump(&mut self, index: usize) -> Result<usize> {
        self.navigate(|c| c.jump(index))
    }

    fn navigate(&mut self, step: impl FnOnce(&mut Cursor)) -> Result<usize> {
        if !self.phase.has_artifact() || self.kind.cursor_policy().is_none() {
            return Err(StudyError::validation(
                "navigation",
                format!("nothing to navigate in a {} session", self.phase),
            ));
        }
        step(&mut self.cursor);
        self.flipped = false;
        Ok(self.cursor.index())
    }

    /// Turns the current flashcard over.
    pub fn flip(&mut self) -> Result<bool> {
        let has_cards = matches!(
            self.artifact.as_ref().map(|a| &a.body),
            Some(ArtifactBody::FlashcardSet(set)) if !set.cards.is_empty()
        );
        if !has_cards {
            return Err(StudyError::validation("flip", "there is no flashcard to flip"));
        }
        self.flipped = !self.flipped;
        Ok(self.flipped)
    }

    // ------------------------------------------------------------------------
    // Results
    // ------------------------------------------------------------------------

    /// Grades the answers once the session is completed.
    ///
    /// `None` before completion and for kinds without questions.
    #[must_use]
    pub fn score(&self) -> Option<ScoreReport> {
        if self.phase != Phase::Completed || !self.kind.is_gradable() {
            return None;
        }
        let artifact = self.artifact.as_ref()?;
        Some(scoring::score(&artifact.gradable_items(), &self.answers))
    }

    /// Seconds spent on a completed timed artifact.
    #[must_use]
    pub fn time_taken_secs(&self) -> Option<u64> {
        let limit = self.artifact.as_ref()?.time_limit_secs()?;
        let remaining = self.remaining_secs?;
        Some(limit.saturating_sub(remaining))
    }

    /// A serializable view of the session.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            kind: self.kind,
            phase: self.phase,
            artifact: self.artifact.clone(),
            answers: self.answers.clone(),
            index: self.cursor.index(),
            item_count: self.cursor.len(),
            progress_percent: self.cursor.progress_percent(),
            flipped: self.flipped,
            remaining_secs: self.remaining_secs,
            time_taken_secs: self.time_taken_secs(),
            completion: self.completion,
            notice: self.notice.clone(),
            score: self.score(),
        }
    }

    fn require(&self, from: Phase, to: Phase) -> Result<()> {
        if self.phase == from {
            Ok(())
        } else {
            Err(StudyError::invalid_transition(self.phase, to))
        }
    }
}

/// Point-in-time copy of a session for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// The tool.
    pub kind: ArtifactKind,
    /// Current phase.
    pub phase: Phase,
    /// Attached artifact.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<Artifact>,
    /// Recorded answers.
    pub answers: BTreeMap<u32, String>,
    /// Cursor position.
    pub index: usize,
    /// Number of navigable items.
    pub item_count: usize,
    /// Position through the items, 0-100.
    pub progress_percent: u8,
    /// Flashcard flip state.
    pub flipped: bool,
    /// Countdown seconds left.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_secs: Option<u64>,
    /// Seconds used on a timed artifact.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_taken_secs: Option<u64>,
    /// Completion reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion: Option<CompletionReason>,
    /// User-visible notice.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    /// Grade, once completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<ScoreReport>,
}
