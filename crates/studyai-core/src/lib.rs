//! StudyAI Core
//!
//! Artifact model, generation-session state machine, scoring, and the ports
//! that connect sessions to content generation and persistence.

pub mod artifact;
pub mod controller;
pub mod countdown;
pub mod cursor;
pub mod error;
pub mod events;
pub mod generator;
pub mod request;
pub mod scoring;
pub mod session;
pub mod source;
pub mod store;

pub use artifact::{
    Artifact, ArtifactBody, ArtifactKind, Card, CardDifficulty, Citation, ConceptExplanationBody,
    EssayBody, EssayOutline, ExplanationStep, FlashcardSetBody, GradableItem, GrammarIssue,
    IssueSeverity, LearningResource, OutlineSection, PracticeTestBody, Question, QuestionType,
    QuizBody, StudyGuideBody, TestQuestion,
};
pub use controller::SessionController;
pub use countdown::Countdown;
pub use cursor::{Cursor, CursorPolicy};
pub use error::{Result, StudyError};
pub use events::{EventBroadcaster, SessionEvent};
pub use generator::{ArtifactDraft, ContentGenerator, PlaceholderGenerator};
pub use request::{
    Difficulty, EssayLength, EssayType, ExplanationLevel, GenerationRequest, GuideFormat,
    QuestionTypeChoice, RequestOptions, MAX_QUESTIONS,
};
pub use scoring::{GradeBand, ReviewEntry, ScoreReport};
pub use session::{
    CompletionReason, GenerationToken, Phase, SessionSnapshot, SessionState, TickOutcome,
};
pub use source::{ArtifactSource, InSessionSource, PersistingSource};
pub use store::ArtifactStore;
