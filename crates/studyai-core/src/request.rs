//! Generation requests.
//!
//! A [`GenerationRequest`] is what a user submits to a study tool: the
//! subject text plus a kind-specific set of options. The artifact kind is
//! derived from the options variant, so a quiz request can never carry
//! essay options.

use serde::{Deserialize, Serialize};

use crate::artifact::ArtifactKind;
use crate::error::{Result, StudyError};

/// Upper bound on questions per quiz or practice test.
pub const MAX_QUESTIONS: u32 = 50;

/// Declares a fieldless enum with a fixed wire name per variant.
///
/// Generates `as_str`, `ALL`, `Display`, and a case-insensitive `FromStr`.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $wire)] $variant ),+
        }

        impl $name {
            /// Every variant in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The wire name of this variant.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $wire ),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = StudyError;

            fn from_str(s: &str) -> Result<Self> {
                let lower = s.trim().to_lowercase();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == lower)
                    .ok_or_else(|| {
                        let expected: Vec<&str> = Self::ALL.iter().map(|v| v.as_str()).collect();
                        StudyError::validation(
                            stringify!($name),
                            format!("'{s}' is not one of: {}", expected.join(", ")),
                        )
                    })
            }
        }
    };
}

pub(crate) use wire_enum;

wire_enum! {
    /// How hard generated quiz questions should be.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub enum Difficulty {
        /// Introductory questions.
        Easy => "easy",
        /// The default level.
        #[default]
        Medium => "medium",
        /// Challenging questions.
        Hard => "hard",
    }
}

wire_enum! {
    /// Which question types a quiz should contain.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub enum QuestionTypeChoice {
        /// Cycle through multiple-choice, true/false, and open-ended.
        #[default]
        Mixed => "mixed",
        /// Multiple-choice only.
        MultipleChoice => "multiple-choice",
        /// True/false only.
        TrueFalse => "true-false",
        /// Open-ended only.
        OpenEnded => "open-ended",
    }
}

wire_enum! {
    /// Which sections a study guide contains.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub enum GuideFormat {
        /// Structured outline only.
        #[default]
        Outline => "outline",
        /// Prose summary with key points only.
        Summary => "summary",
        /// Outline, summary, and key points.
        Both => "both",
    }
}

wire_enum! {
    /// Rhetorical mode of an essay.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub enum EssayType {
        /// Argues a position with evidence.
        #[default]
        Argumentative => "argumentative",
        /// Tries to convince the reader.
        Persuasive => "persuasive",
        /// Explains a topic neutrally.
        Expository => "expository",
        /// Tells a story.
        Narrative => "narrative",
        /// Describes a subject in detail.
        Descriptive => "descriptive",
        /// Compares and contrasts two subjects.
        CompareContrast => "compare-contrast",
    }
}

wire_enum! {
    /// Target length of an essay.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub enum EssayLength {
        /// Roughly 300-500 words.
        Short => "short",
        /// Roughly 500-800 words.
        #[default]
        Medium => "medium",
        /// Roughly 800-1200 words.
        Long => "long",
        /// More than 1200 words.
        Extended => "extended",
    }
}

wire_enum! {
    /// Depth of a concept explanation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub enum ExplanationLevel {
        /// No prior knowledge assumed.
        Beginner => "beginner",
        /// Some familiarity assumed.
        #[default]
        Intermediate => "intermediate",
        /// Deep dive.
        Advanced => "advanced",
    }
}

/// Kind-specific options for a generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RequestOptions {
    /// Options for a quiz.
    #[serde(rename_all = "camelCase")]
    Quiz {
        /// Question difficulty.
        difficulty: Difficulty,
        /// Question type selection.
        question_type: QuestionTypeChoice,
        /// Number of questions to generate.
        num_questions: u32,
    },
    /// A flashcard set takes no options.
    FlashcardSet,
    /// Options for a study guide.
    StudyGuide {
        /// Sections to include.
        format: GuideFormat,
    },
    /// Options for a timed practice test.
    #[serde(rename_all = "camelCase")]
    PracticeTest {
        /// Time limit in minutes.
        time_limit_minutes: u32,
        /// Number of questions to generate.
        num_questions: u32,
    },
    /// Options for an essay.
    #[serde(rename_all = "camelCase")]
    Essay {
        /// Rhetorical mode.
        essay_type: EssayType,
        /// Target length.
        length: EssayLength,
    },
    /// Options for a concept explanation.
    ConceptExplanation {
        /// Depth of the explanation.
        level: ExplanationLevel,
    },
}

impl RequestOptions {
    /// Default options for the given kind.
    #[must_use]
    pub const fn defaults_for(kind: ArtifactKind) -> Self {
        match kind {
            ArtifactKind::Quiz => Self::Quiz {
                difficulty: Difficulty::Medium,
                question_type: QuestionTypeChoice::Mixed,
                num_questions: 10,
            },
            ArtifactKind::FlashcardSet => Self::FlashcardSet,
            ArtifactKind::StudyGuide => Self::StudyGuide {
                format: GuideFormat::Outline,
            },
            ArtifactKind::PracticeTest => Self::PracticeTest {
                time_limit_minutes: 30,
                num_questions: 20,
            },
            ArtifactKind::Essay => Self::Essay {
                essay_type: EssayType::Argumentative,
                length: EssayLength::Medium,
            },
            ArtifactKind::ConceptExplanation => Self::ConceptExplanation {
                level: ExplanationLevel::Intermediate,
            },
        }
    }

    /// The artifact kind these options produce.
    #[must_use]
    pub const fn kind(&self) -> ArtifactKind {
        match self {
            Self::Quiz { .. } => ArtifactKind::Quiz,
            Self::FlashcardSet => ArtifactKind::FlashcardSet,
            Self::StudyGuide { .. } => ArtifactKind::StudyGuide,
            Self::PracticeTest { .. } => ArtifactKind::PracticeTest,
            Self::Essay { .. } => ArtifactKind::Essay,
            Self::ConceptExplanation { .. } => ArtifactKind::ConceptExplanation,
        }
    }
}

/// A user's request to generate one study artifact.
///
/// # Examples
///
/// ```
/// use studyai_core::{ArtifactKind, GenerationRequest, RequestOptions};
///
/// let request = GenerationRequest::new(
///     "photosynthesis",
///     RequestOptions::defaults_for(ArtifactKind::Quiz),
/// );
/// assert_eq!(request.kind(), ArtifactKind::Quiz);
/// assert!(request.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    /// Topic, subject, concept, or pasted content, depending on the tool.
    pub subject_text: String,
    /// Kind-specific options.
    pub options: RequestOptions,
}

impl GenerationRequest {
    /// Creates a new request. Call [`validate`](Self::validate) before use.
    #[must_use]
    pub fn new(subject_text: impl Into<String>, options: RequestOptions) -> Self {
        Self {
            subject_text: subject_text.into(),
            options,
        }
    }

    /// The artifact kind this request produces.
    #[must_use]
    pub const fn kind(&self) -> ArtifactKind {
        self.options.kind()
    }

    /// The subject text with surrounding whitespace removed.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject_text.trim()
    }

    /// Checks that the request can be sent to a generator.
    pub fn validate(&self) -> Result<()> {
        if self.subject().is_empty() {
            return Err(StudyError::validation(
                self.kind().subject_label(),
                "must not be empty",
            ));
        }

        match self.options {
            RequestOptions::Quiz { num_questions, .. }
            | RequestOptions::PracticeTest { num_questions, .. }
                if num_questions == 0 || num_questions > MAX_QUESTIONS =>
            {
                Err(StudyError::validation(
                    "numQuestions",
                    format!("must be between 1 and {MAX_QUESTIONS}, got {num_questions}"),
                ))
            }
            RequestOptions::PracticeTest {
                time_limit_minutes: 0,
                ..
            } => Err(StudyError::validation(
                "timeLimitMinutes",
                "must be greater than zero",
            )),
            _ => Ok(()),
        }
    }
}
