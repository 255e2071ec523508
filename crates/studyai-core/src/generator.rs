//! Content generation.
//!
//! [`ContentGenerator`] is the seam where a language model would plug in.
//! [`PlaceholderGenerator`] fills every kind with deterministic sample
//! content so the rest of the system can run end to end.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::artifact::{
    Artifact, ArtifactBody, Card, CardDifficulty, Citation, ConceptExplanationBody, EssayBody,
    EssayOutline, ExplanationStep, FlashcardSetBody, GrammarIssue, IssueSeverity,
    LearningResource, OutlineSection, PracticeTestBody, Question, QuestionType, QuizBody,
    StudyGuideBody, TestQuestion,
};
use crate::error::Result;
use crate::request::{
    ExplanationLevel, GenerationRequest, GuideFormat, QuestionTypeChoice, RequestOptions,
};

/// Default number of cards in a generated flashcard set.
pub const DEFAULT_FLASHCARD_COUNT: u32 = 10;

/// Generated content that has not been assigned an identity yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactDraft {
    /// Display title.
    pub title: String,
    /// Kind-specific content.
    pub body: ArtifactBody,
}

impl ArtifactDraft {
    /// Assigns a fresh id and creation time.
    #[must_use]
    pub fn into_artifact(self) -> Artifact {
        self.into_artifact_with(Uuid::new_v4(), Utc::now())
    }

    /// Assigns the given id and creation time.
    #[must_use]
    pub fn into_artifact_with(self, id: Uuid, created_at: DateTime<Utc>) -> Artifact {
        Artifact {
            id,
            title: self.title,
            created_at,
            body: self.body,
        }
    }
}

/// Produces artifact content for a request.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Generates a draft whose kind matches `request.kind()`.
    async fn generate(&self, request: &GenerationRequest) -> Result<ArtifactDraft>;
}

/// Generator that fabricates sample content without any model.
#[derive(Debug, Clone)]
pub struct PlaceholderGenerator {
    flashcard_count: u32,
}

impl Default for PlaceholderGenerator {
    fn default() -> Self {
        Self {
            flashcard_count: DEFAULT_FLASHCARD_COUNT,
        }
    }
}

impl PlaceholderGenerator {
    /// Creates a generator with the default flashcard count.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides how many cards a flashcard set gets.
    #[must_use]
    pub const fn with_flashcard_count(mut self, count: u32) -> Self {
        self.flashcard_count = count;
        self
    }

    /// Builds the draft synchronously.
    #[must_use]
    pub fn draft(&self, request: &GenerationRequest) -> ArtifactDraft {
        let subject = request.subject();
        match request.options {
            RequestOptions::Quiz {
                difficulty,
                question_type,
                num_questions,
            } => ArtifactDraft {
                title: format!("Quiz: {subject}"),
                body: ArtifactBody::Quiz(QuizBody {
                    topic: subject.to_string(),
                    difficulty,
                    questions: (1..=num_questions)
                        .map(|n| quiz_question(subject, question_type, n))
                        .collect(),
                }),
            },
            RequestOptions::FlashcardSet => ArtifactDraft {
                title: format!("Flashcards: {subject}"),
                body: ArtifactBody::FlashcardSet(FlashcardSetBody {
                    topic: subject.to_string(),
                    cards: self.cards(subject),
                }),
            },
            RequestOptions::StudyGuide { format } => ArtifactDraft {
                title: "Study Guide".to_string(),
                body: ArtifactBody::StudyGuide(study_guide(format)),
            },
            RequestOptions::PracticeTest {
                time_limit_minutes,
                num_questions,
            } => ArtifactDraft {
                title: format!("Practice Test: {subject}"),
                body: ArtifactBody::PracticeTest(PracticeTestBody {
                    subject: subject.to_string(),
                    time_limit_minutes,
                    questions: (1..=num_questions)
                        .map(|id| TestQuestion {
                            id,
                            prompt: format!("Practice question {id} about {subject}?"),
                            options: sample_options(),
                            correct_answer: "Option A".to_string(),
                            points: 1,
                        })
                        .collect(),
                }),
            },
            RequestOptions::Essay { essay_type, length } => ArtifactDraft {
                title: subject.to_string(),
                body: ArtifactBody::Essay(EssayBody {
                    topic: subject.to_string(),
                    essay_type,
                    length,
                    outline: EssayOutline {
                        introduction: "Hook, background information, and thesis statement"
                            .to_string(),
                        body_points: ["First", "Second", "Third"]
                            .iter()
                            .map(|ord| format!("{ord} main argument with supporting evidence"))
                            .collect(),
                        conclusion: "Restatement of thesis and final thoughts".to_string(),
                    },
                    draft: essay_draft(subject),
                    grammar_issues: vec![
                        GrammarIssue {
                            severity: IssueSeverity::Warning,
                            message: "Consider using more varied sentence structures".to_string(),
                            line_ref: 3,
                        },
                        GrammarIssue {
                            severity: IssueSeverity::Suggestion,
                            message: "This paragraph could benefit from more specific examples"
                                .to_string(),
                            line_ref: 7,
                        },
                        GrammarIssue {
                            severity: IssueSeverity::Info,
                            message: "Citation needed for this claim".to_string(),
                            line_ref: 11,
                        },
                    ],
                    grammar_score: 85,
                    citations: sample_citations(),
                }),
            },
            RequestOptions::ConceptExplanation { level } => ArtifactDraft {
                title: format!("Understanding {subject}"),
                body: ArtifactBody::ConceptExplanation(concept_explanation(subject, level)),
            },
        }
    }

    fn cards(&self, topic: &str) -> Vec<Card> {
        let now = Utc::now();
        (1..=self.flashcard_count)
            .map(|id| Card {
                id,
                front: format!("Front of card {id} about {topic}"),
                back: format!("Back of card {id} with detailed explanation about {topic}"),
                difficulty: if id % 2 == 1 {
                    CardDifficulty::Easy
                } else {
                    CardDifficulty::Medium
                },
                last_reviewed_at: None,
                next_review_at: now,
            })
            .collect()
    }
}

#[async_trait]
impl ContentGenerator for PlaceholderGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<ArtifactDraft> {
        request.validate()?;
        Ok(self.draft(request))
    }
}

fn sample_options() -> Vec<String> {
    ["Option A", "Option B", "Option C", "Option D"]
        .iter()
        .map(ToString::to_string)
        .collect()
}

fn quiz_question(topic: &str, choice: QuestionTypeChoice, id: u32) -> Question {
    let question_type = match choice {
        QuestionTypeChoice::Mixed => match (id - 1) % 3 {
            0 => QuestionType::MultipleChoice,
            1 => QuestionType::TrueFalse,
            _ => QuestionType::OpenEnded,
        },
        QuestionTypeChoice::MultipleChoice => QuestionType::MultipleChoice,
        QuestionTypeChoice::TrueFalse => QuestionType::TrueFalse,
        QuestionTypeChoice::OpenEnded => QuestionType::OpenEnded,
    };

    let (options, correct_answer) = match question_type {
        QuestionType::MultipleChoice => (Some(sample_options()), "Option A"),
        QuestionType::TrueFalse => (None, "true"),
        QuestionType::OpenEnded => (None, "Sample answer"),
    };

    Question {
        id,
        prompt: format!("Sample question {id} about {topic}?"),
        question_type,
        options,
        correct_answer: correct_answer.to_string(),
        explanation: format!("This is the explanation for question {id}."),
    }
}

fn study_guide(format: GuideFormat) -> StudyGuideBody {
    let outline = || {
        vec![
            OutlineSection {
                title: "Key Concepts".to_string(),
                items: (1..=3).map(|n| format!("Main idea {n}")).collect(),
            },
            OutlineSection {
                title: "Important Terms".to_string(),
                items: (1..=3).map(|n| format!("Term {n}: Definition")).collect(),
            },
        ]
    };
    let with_outline = matches!(format, GuideFormat::Outline | GuideFormat::Both);
    let with_summary = matches!(format, GuideFormat::Summary | GuideFormat::Both);

    StudyGuideBody {
        format,
        outline: with_outline.then(outline),
        summary: with_summary
            .then(|| "This is a comprehensive summary of the provided content.".to_string()),
        key_points: with_summary.then(|| (1..=5).map(|n| format!("Point {n}")).collect()),
    }
}

fn essay_draft(topic: &str) -> String {
    format!(
        "# {topic}\n\n\
         ## Introduction\n\n\
         This essay explores the important topic of {topic}. Understanding this subject matters \
         for several reasons, and the sections below examine its key aspects.\n\n\
         ## Body Paragraph 1\n\n\
         The first major point to consider regarding {topic} is its fundamental importance in \
         our society.\n\n\
         ## Body Paragraph 2\n\n\
         When examining {topic}, we must consider the perspectives of different stakeholders.\n\n\
         ## Body Paragraph 3\n\n\
         The practical applications of understanding {topic} extend beyond theoretical \
         knowledge.\n\n\
         ## Conclusion\n\n\
         In conclusion, {topic} is a multifaceted subject that deserves careful study."
    )
}

fn sample_citations() -> Vec<Citation> {
    vec![
        Citation::Book {
            author: "Smith, J.".to_string(),
            title: "Understanding the Topic".to_string(),
            year: 2023,
        },
        Citation::Article {
            author: "Johnson, M.".to_string(),
            title: "Recent Developments".to_string(),
            journal: "Academic Journal".to_string(),
            year: 2024,
        },
        Citation::Website {
            author: "Research Institute".to_string(),
            title: "Topic Analysis".to_string(),
            url: "https://example.com".to_string(),
            accessed: "2024-01-15".to_string(),
        },
    ]
}

fn concept_explanation(concept: &str, level: ExplanationLevel) -> ConceptExplanationBody {
    let steps = [
        (
            "Understanding the Basics",
            format!("First, we need to understand what {concept} means and why it matters."),
        ),
        (
            "Key Components",
            format!("The main components of {concept} are several interconnected elements."),
        ),
        (
            "Practical Application",
            format!("Here is how {concept} is applied in real-world scenarios."),
        ),
        (
            "Common Examples",
            format!("Some common examples of {concept} you might meet in everyday life."),
        ),
    ];

    ConceptExplanationBody {
        concept: concept.to_string(),
        level,
        simple_explanation: format!(
            "Here's a simple explanation of {concept}: it involves understanding the \
             fundamental principles and how they apply in practical situations."
        ),
        steps: steps
            .into_iter()
            .zip(1..)
            .map(|((title, content), step)| ExplanationStep {
                step,
                title: title.to_string(),
                content,
            })
            .collect(),
        analogy: format!(
            "Think of {concept} like a recipe: ingredients combined in the right order \
             produce a dish, and the elements of {concept} work together the same way."
        ),
        related_concepts: vec![
            format!("Related Concept 1 to {concept}"),
            "Another Related Topic".to_string(),
            "Connected Principle".to_string(),
            "Similar Framework".to_string(),
        ],
        resources: ["Further Reading on this Topic", "Video Tutorial", "Practice Exercises"]
            .iter()
            .map(|title| LearningResource {
                title: (*title).to_string(),
                url: "#".to_string(),
            })
            .collect(),
    }
}
