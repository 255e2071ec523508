//! Grading of quiz and practice-test answers.
//!
//! Answers are compared to the expected answer by exact, case-sensitive
//! string equality. Unanswered questions count as incorrect.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::artifact::GradableItem;

/// Label shown in place of a missing answer.
pub const NOT_ANSWERED: &str = "Not answered";

/// Coarse grade derived from a percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradeBand {
    /// 80% or higher.
    Strong,
    /// 60% to 79%.
    Passing,
    /// Below 60%.
    NeedsWork,
}

impl GradeBand {
    /// Band for a percentage.
    #[must_use]
    pub const fn from_percent(percent: u8) -> Self {
        match percent {
            80.. => Self::Strong,
            60..=79 => Self::Passing,
            _ => Self::NeedsWork,
        }
    }
}

impl std::fmt::Display for GradeBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strong => write!(f, "strong"),
            Self::Passing => write!(f, "passing"),
            Self::NeedsWork => write!(f, "needs work"),
        }
    }
}

/// One graded question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEntry {
    /// Question id.
    pub question_id: u32,
    /// Question text.
    pub prompt: String,
    /// The recorded answer, if any.
    pub your_answer: Option<String>,
    /// The expected answer.
    pub correct_answer: String,
    /// Whether the recorded answer matched exactly.
    pub is_correct: bool,
}

impl ReviewEntry {
    /// The recorded answer, or [`NOT_ANSWERED`].
    #[must_use]
    pub fn answer_display(&self) -> &str {
        self.your_answer.as_deref().unwrap_or(NOT_ANSWERED)
    }
}

/// Result of grading a set of answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreReport {
    /// Number of correct answers.
    pub correct: usize,
    /// Number of questions.
    pub total: usize,
    /// Number of questions with any recorded answer.
    pub answered: usize,
    /// `round(100 * correct / total)`, or 0 when there are no questions.
    pub percent: u8,
    /// Grade band for `percent`.
    pub band: GradeBand,
    /// Per-question breakdown in question order.
    pub entries: Vec<ReviewEntry>,
}

/// Grades recorded answers against the expected answers.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use studyai_core::{scoring::score, GradableItem};
///
/// let items = [
///     GradableItem { id: 1, prompt: "2+2?", correct_answer: "4" },
///     GradableItem { id: 2, prompt: "Sky?", correct_answer: "blue" },
/// ];
/// let answers = BTreeMap::from([(1, "4".to_string()), (2, "Blue".to_string())]);
///
/// let report = score(&items, &answers);
/// assert_eq!(report.correct, 1);
/// assert_eq!(report.percent, 50);
/// ```
#[must_use]
pub fn score(items: &[GradableItem<'_>], answers: &BTreeMap<u32, String>) -> ScoreReport {
    let entries: Vec<ReviewEntry> = items
        .iter()
        .map(|item| {
            let your_answer = answers.get(&item.id).cloned();
            let is_correct = your_answer.as_deref() == Some(item.correct_answer);
            ReviewEntry {
                question_id: item.id,
                prompt: item.prompt.to_string(),
                your_answer,
                correct_answer: item.correct_answer.to_string(),
                is_correct,
            }
        })
        .collect();

    let correct = entries.iter().filter(|e| e.is_correct).count();
    let answered = entries.iter().filter(|e| e.your_answer.is_some()).count();
    let total = entries.len();
    let percent = percent_of(correct, total);

    ScoreReport {
        correct,
        total,
        answered,
        percent,
        band: GradeBand::from_percent(percent),
        entries,
    }
}

/// `round(100 * part / whole)` with halves rounded away from zero.
#[must_use]
pub fn percent_of(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let percent = (100.0 * part as f64 / whole as f64).round().min(100.0) as u8;
    percent
}

/// Formats seconds as `m:ss`.
///
/// # Examples
///
/// ```
/// use studyai_core::scoring::format_clock;
///
/// assert_eq!(format_clock(1800), "30:00");
/// assert_eq!(format_clock(65), "1:05");
/// ```
#[must_use]
pub fn format_clock(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
