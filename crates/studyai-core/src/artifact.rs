//! Study artifacts.
//!
//! An [`Artifact`] is the generated output of one tool: a quiz, a flashcard
//! set, a study guide, a practice test, an essay, or a concept explanation.
//! The body is a tagged union so its shape is always determined by its kind.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cursor::CursorPolicy;
use crate::error::{Result, StudyError};
use crate::request::{
    wire_enum, Difficulty, EssayLength, EssayType, ExplanationLevel, GuideFormat,
};

// ============================================================================
// ArtifactKind
// ============================================================================

/// The six kinds of study artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// A self-paced quiz.
    Quiz,
    /// A deck of flashcards.
    FlashcardSet,
    /// A study guide.
    StudyGuide,
    /// A timed practice test.
    PracticeTest,
    /// An essay draft with outline, grammar notes, and citations.
    Essay,
    /// A layered explanation of one concept.
    ConceptExplanation,
}

impl ArtifactKind {
    /// Every kind in declaration order.
    pub const ALL: &'static [Self] = &[
        Self::Quiz,
        Self::FlashcardSet,
        Self::StudyGuide,
        Self::PracticeTest,
        Self::Essay,
        Self::ConceptExplanation,
    ];

    /// The snake_case identifier used in storage and on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quiz => "quiz",
            Self::FlashcardSet => "flashcard_set",
            Self::StudyGuide => "study_guide",
            Self::PracticeTest => "practice_test",
            Self::Essay => "essay",
            Self::ConceptExplanation => "concept_explanation",
        }
    }

    /// Human-readable name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Quiz => "Quiz",
            Self::FlashcardSet => "Flashcard set",
            Self::StudyGuide => "Study guide",
            Self::PracticeTest => "Practice test",
            Self::Essay => "Essay",
            Self::ConceptExplanation => "Concept explanation",
        }
    }

    /// Name of the subject field for this kind's request form.
    #[must_use]
    pub const fn subject_label(self) -> &'static str {
        match self {
            Self::Quiz | Self::FlashcardSet | Self::Essay => "topic",
            Self::StudyGuide => "content",
            Self::PracticeTest => "subject",
            Self::ConceptExplanation => "concept",
        }
    }

    /// Whether artifacts of this kind are written to the artifact store.
    ///
    /// Practice tests, essays, and concept explanations live only for the
    /// duration of a session.
    #[must_use]
    pub const fn is_persisted(self) -> bool {
        matches!(self, Self::Quiz | Self::FlashcardSet | Self::StudyGuide)
    }

    /// Whether review of this kind runs against a countdown.
    #[must_use]
    pub const fn is_timed(self) -> bool {
        matches!(self, Self::PracticeTest)
    }

    /// Whether this kind has answerable questions.
    #[must_use]
    pub const fn is_gradable(self) -> bool {
        matches!(self, Self::Quiz | Self::PracticeTest)
    }

    /// How the item cursor moves for this kind, if it has items.
    #[must_use]
    pub const fn cursor_policy(self) -> Option<CursorPolicy> {
        match self {
            Self::Quiz | Self::PracticeTest => Some(CursorPolicy::Clamp),
            Self::FlashcardSet => Some(CursorPolicy::Wrap),
            Self::StudyGuide | Self::Essay | Self::ConceptExplanation => None,
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for ArtifactKind {
    type Err = StudyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "quiz" => Ok(Self::Quiz),
            "flashcards" | "flashcard_set" => Ok(Self::FlashcardSet),
            "studyguide" | "study_guide" | "guide" => Ok(Self::StudyGuide),
            "practice_test" | "test" => Ok(Self::PracticeTest),
            "essay" => Ok(Self::Essay),
            "concept" | "concept_explanation" | "explain" => Ok(Self::ConceptExplanation),
            other => Err(StudyError::validation(
                "tool",
                format!("unknown study tool '{other}'"),
            )),
        }
    }
}

// ============================================================================
// Body Components
// ============================================================================

wire_enum! {
    /// The answer format of a single quiz question.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub enum QuestionType {
        /// Pick one of several options.
        MultipleChoice => "multiple-choice",
        /// Answer "true" or "false".
        TrueFalse => "true-false",
        /// Free text.
        OpenEnded => "open-ended",
    }
}

/// One quiz question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Identifier unique within the quiz.
    pub id: u32,
    /// The question text.
    pub prompt: String,
    /// Answer format.
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    /// Choices, present only for multiple-choice questions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    /// The exact expected answer.
    pub correct_answer: String,
    /// Why the answer is correct.
    pub explanation: String,
}

/// Body of a quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizBody {
    /// What the quiz is about.
    pub topic: String,
    /// Requested difficulty.
    pub difficulty: Difficulty,
    /// Ordered questions.
    pub questions: Vec<Question>,
}

wire_enum! {
    /// Self-assessed difficulty of a flashcard.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub enum CardDifficulty {
        /// Easy card.
        Easy => "easy",
        /// Medium card.
        Medium => "medium",
    }
}

/// One flashcard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Identifier unique within the set.
    pub id: u32,
    /// Prompt side.
    pub front: String,
    /// Answer side.
    pub back: String,
    /// Difficulty tag.
    pub difficulty: CardDifficulty,
    /// When the card was last reviewed, if ever.
    pub last_reviewed_at: Option<DateTime<Utc>>,
    /// When the card is next due.
    pub next_review_at: DateTime<Utc>,
}

/// Body of a flashcard set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardSetBody {
    /// What the cards cover.
    pub topic: String,
    /// Ordered cards.
    pub cards: Vec<Card>,
}

/// A titled group of outline items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineSection {
    /// Section heading.
    pub title: String,
    /// Ordered items.
    pub items: Vec<String>,
}

/// Body of a study guide.
///
/// Which sections are present depends on `format`: an outline guide has only
/// `outline`, a summary guide has `summary` and `key_points`, and `both` has
/// all three.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyGuideBody {
    /// Requested format.
    pub format: GuideFormat,
    /// Structured outline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outline: Option<Vec<OutlineSection>>,
    /// Prose summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Key takeaways accompanying the summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_points: Option<Vec<String>>,
}

/// One practice test question. Always multiple-choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestQuestion {
    /// Identifier unique within the test.
    pub id: u32,
    /// The question text.
    pub prompt: String,
    /// Choices; never empty.
    pub options: Vec<String>,
    /// The exact expected answer.
    pub correct_answer: String,
    /// Weight of the question; always 1.
    pub points: u32,
}

/// Body of a practice test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeTestBody {
    /// What the test covers.
    pub subject: String,
    /// Time allowed, in minutes.
    pub time_limit_minutes: u32,
    /// Ordered questions.
    pub questions: Vec<TestQuestion>,
}

/// Skeleton of an essay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EssayOutline {
    /// What the introduction covers.
    pub introduction: String,
    /// One entry per body paragraph.
    pub body_points: Vec<String>,
    /// What the conclusion covers.
    pub conclusion: String,
}

wire_enum! {
    /// How serious a grammar note is.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub enum IssueSeverity {
        /// Should be fixed.
        Warning => "warning",
        /// Could be improved.
        Suggestion => "suggestion",
        /// For information.
        Info => "info",
    }
}

/// One note from the grammar check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrammarIssue {
    /// Severity of the note.
    pub severity: IssueSeverity,
    /// What to change.
    pub message: String,
    /// Line of the draft the note refers to.
    pub line_ref: u32,
}

/// A bibliography entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Citation {
    /// A book.
    Book {
        /// Author in "Surname, I." form.
        author: String,
        /// Book title.
        title: String,
        /// Publication year.
        year: i32,
    },
    /// A journal article.
    Article {
        /// Author in "Surname, I." form.
        author: String,
        /// Article title.
        title: String,
        /// Journal name.
        journal: String,
        /// Publication year.
        year: i32,
    },
    /// A web page.
    Website {
        /// Publishing person or organisation.
        author: String,
        /// Page title.
        title: String,
        /// Page address.
        url: String,
        /// Date the page was accessed, as `YYYY-MM-DD`.
        accessed: String,
    },
}

impl Citation {
    /// The entry formatted as one bibliography line.
    #[must_use]
    pub fn formatted(&self) -> String {
        match self {
            Self::Book {
                author,
                title,
                year,
            } => format!("{author} ({year}). {title}."),
            Self::Article {
                author,
                title,
                journal,
                year,
            } => format!("{author} ({year}). {title}. {journal}."),
            Self::Website {
                author,
                title,
                url,
                accessed,
            } => format!("{author}. {title}. Retrieved {accessed}, from {url}"),
        }
    }
}

/// Body of an essay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EssayBody {
    /// Essay topic.
    pub topic: String,
    /// Rhetorical mode.
    pub essay_type: EssayType,
    /// Target length.
    pub length: EssayLength,
    /// Structural outline.
    pub outline: EssayOutline,
    /// Markdown draft.
    pub draft: String,
    /// Notes from the grammar check.
    pub grammar_issues: Vec<GrammarIssue>,
    /// Overall grammar score out of 100.
    pub grammar_score: u8,
    /// Suggested sources.
    pub citations: Vec<Citation>,
}

/// One step of a step-by-step explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplanationStep {
    /// 1-based position.
    pub step: u32,
    /// Step heading.
    pub title: String,
    /// Step text.
    pub content: String,
}

/// A pointer to further material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningResource {
    /// Resource title.
    pub title: String,
    /// Resource address.
    pub url: String,
}

/// Body of a concept explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptExplanationBody {
    /// The concept being explained.
    pub concept: String,
    /// Requested depth.
    pub level: ExplanationLevel,
    /// A short plain-language explanation.
    pub simple_explanation: String,
    /// Ordered steps.
    pub steps: Vec<ExplanationStep>,
    /// An everyday analogy.
    pub analogy: String,
    /// Neighbouring topics.
    pub related_concepts: Vec<String>,
    /// Further reading.
    pub resources: Vec<LearningResource>,
}

// ============================================================================
// Artifact
// ============================================================================

/// Kind-specific content of an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArtifactBody {
    /// Quiz content.
    Quiz(QuizBody),
    /// Flashcard content.
    FlashcardSet(FlashcardSetBody),
    /// Study guide content.
    StudyGuide(StudyGuideBody),
    /// Practice test content.
    PracticeTest(PracticeTestBody),
    /// Essay content.
    Essay(EssayBody),
    /// Concept explanation content.
    ConceptExplanation(ConceptExplanationBody),
}

impl ArtifactBody {
    /// The kind of this body.
    #[must_use]
    pub const fn kind(&self) -> ArtifactKind {
        match self {
            Self::Quiz(_) => ArtifactKind::Quiz,
            Self::FlashcardSet(_) => ArtifactKind::FlashcardSet,
            Self::StudyGuide(_) => ArtifactKind::StudyGuide,
            Self::PracticeTest(_) => ArtifactKind::PracticeTest,
            Self::Essay(_) => ArtifactKind::Essay,
            Self::ConceptExplanation(_) => ArtifactKind::ConceptExplanation,
        }
    }
}

/// A question reduced to what grading needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradableItem<'a> {
    /// Question id.
    pub id: u32,
    /// Question text.
    pub prompt: &'a str,
    /// Expected answer.
    pub correct_answer: &'a str,
}

/// A generated study artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    /// Identifier assigned at creation.
    pub id: Uuid,
    /// Display title.
    pub title: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Kind-specific content.
    #[serde(flatten)]
    pub body: ArtifactBody,
}

impl Artifact {
    /// The kind of this artifact.
    #[must_use]
    pub const fn kind(&self) -> ArtifactKind {
        self.body.kind()
    }

    /// Number of items the review cursor moves over.
    #[must_use]
    pub fn navigable_len(&self) -> usize {
        match &self.body {
            ArtifactBody::Quiz(quiz) => quiz.questions.len(),
            ArtifactBody::PracticeTest(test) => test.questions.len(),
            ArtifactBody::FlashcardSet(set) => set.cards.len(),
            _ => 0,
        }
    }

    /// The countdown length for timed artifacts.
    #[must_use]
    pub fn time_limit_secs(&self) -> Option<u64> {
        match &self.body {
            ArtifactBody::PracticeTest(test) => Some(u64::from(test.time_limit_minutes) * 60),
            _ => None,
        }
    }

    /// Questions with their expected answers, in order.
    ///
    /// Empty for kinds without questions.
    #[must_use]
    pub fn gradable_items(&self) -> Vec<GradableItem<'_>> {
        match &self.body {
            ArtifactBody::Quiz(quiz) => quiz
                .questions
                .iter()
                .map(|q| GradableItem {
                    id: q.id,
                    prompt: &q.prompt,
                    correct_answer: &q.correct_answer,
                })
                .collect(),
            ArtifactBody::PracticeTest(test) => test
                .questions
                .iter()
                .map(|q| GradableItem {
                    id: q.id,
                    prompt: &q.prompt,
                    correct_answer: &q.correct_answer,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Whether a question with this id exists.
    #[must_use]
    pub fn has_question(&self, id: u32) -> bool {
        self.gradable_items().iter().any(|item| item.id == id)
    }

    /// The id of the question at a cursor position.
    #[must_use]
    pub fn question_id_at(&self, index: usize) -> Option<u32> {
        self.gradable_items().get(index).map(|item| item.id)
    }

    /// Checks that the body is well formed for its kind.
    pub fn validate(&self) -> Result<()> {
        match &self.body {
            ArtifactBody::Quiz(quiz) => {
                unique_ids(quiz.questions.iter().map(|q| q.id))?;
                for q in &quiz.questions {
                    match (q.question_type, &q.options) {
                        (QuestionType::MultipleChoice, Some(options)) if !options.is_empty() => {}
                        (QuestionType::MultipleChoice, _) => {
                            return Err(StudyError::generation(format!(
                                "multiple-choice question {} has no options",
                                q.id
                            )));
                        }
                        (_, Some(_)) => {
                            return Err(StudyError::generation(format!(
                                "{} question {} must not have options",
                                q.question_type, q.id
                            )));
                        }
                        (_, None) => {}
                    }
                }
            }
            ArtifactBody::PracticeTest(test) => {
                if test.time_limit_minutes == 0 {
                    return Err(StudyError::generation("practice test has no time limit"));
                }
                unique_ids(test.questions.iter().map(|q| q.id))?;
                if let Some(q) = test
                    .questions
                    .iter()
                    .find(|q| q.options.is_empty() || q.points != 1)
                {
                    return Err(StudyError::generation(format!(
                        "practice question {} must have options and be worth 1 point",
                        q.id
                    )));
                }
            }
            ArtifactBody::FlashcardSet(set) => unique_ids(set.cards.iter().map(|c| c.id))?,
            ArtifactBody::StudyGuide(guide) => {
                let wants_outline =
                    matches!(guide.format, GuideFormat::Outline | GuideFormat::Both);
                let wants_summary =
                    matches!(guide.format, GuideFormat::Summary | GuideFormat::Both);
                if wants_outline != guide.outline.is_some()
                    || wants_summary != guide.summary.is_some()
                    || wants_summary != guide.key_points.is_some()
                {
                    return Err(StudyError::generation(format!(
                        "study guide sections do not match format '{}'",
                        guide.format
                    )));
                }
            }
            ArtifactBody::Essay(essay) => {
                if essay.grammar_score > 100 {
                    return Err(StudyError::generation("grammar score exceeds 100"));
                }
            }
            ArtifactBody::ConceptExplanation(_) => {}
        }
        Ok(())
    }
}

fn unique_ids(ids: impl Iterator<Item = u32>) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(StudyError::generation(format!("duplicate item id {id}")));
        }
    }
    Ok(())
}
