//! Plain-text rendering of artifacts, session state, and results.
//!
//! Every function returns a `String` so the study loop decides where output
//! goes. Practice tests never show the expected answer until the session is
//! completed.

use std::fmt::Write;

use studyai_core::scoring::format_clock;
use studyai_core::{
    Artifact, ArtifactBody, ConceptExplanationBody, EssayBody, GradeBand, Phase, ScoreReport,
    SessionEvent, SessionSnapshot, StudyError, StudyGuideBody,
};

/// Countdown values at which a tick is printed.
const ANNOUNCED_TICKS: [u64; 5] = [300, 60, 30, 10, 5];

/// Letters used to label multiple-choice options.
const OPTION_LABELS: &str = "ABCDEFGHIJ";

/// Header line plus the full content for kinds without navigation.
pub fn overview(artifact: &Artifact) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "== {} ==", artifact.title);
    let _ = writeln!(
        output,
        "{} | id {} | created {}",
        artifact.kind(),
        artifact.id,
        artifact.created_at.format("%Y-%m-%d %H:%M UTC")
    );

    match &artifact.body {
        ArtifactBody::Quiz(quiz) => {
            let _ = writeln!(
                output,
                "{} questions, {} difficulty. Answer any question to begin.",
                quiz.questions.len(),
                quiz.difficulty
            );
        }
        ArtifactBody::FlashcardSet(set) => {
            let _ = writeln!(output, "{} cards on {}.", set.cards.len(), set.topic);
        }
        ArtifactBody::PracticeTest(test) => {
            let _ = writeln!(
                output,
                "{} questions, {} minutes. Type 'start' to begin the clock.",
                test.questions.len(),
                test.time_limit_minutes
            );
        }
        ArtifactBody::StudyGuide(guide) => write_study_guide(&mut output, guide),
        ArtifactBody::Essay(essay) => write_essay(&mut output, essay),
        ArtifactBody::ConceptExplanation(concept) => write_concept(&mut output, concept),
    }

    output
}

fn write_study_guide(output: &mut String, guide: &StudyGuideBody) {
    if let Some(sections) = &guide.outline {
        let _ = writeln!(output, "\nOutline");
        for section in sections {
            let _ = writeln!(output, "  {}", section.title);
            for item in &section.items {
                let _ = writeln!(output, "    - {item}");
            }
        }
    }
    if let Some(summary) = &guide.summary {
        let _ = writeln!(output, "\nSummary\n  {summary}");
    }
    if let Some(points) = &guide.key_points {
        let _ = writeln!(output, "\nKey points");
        for point in points {
            let _ = writeln!(output, "  * {point}");
        }
    }
}

fn write_essay(output: &mut String, essay: &EssayBody) {
    let _ = writeln!(output, "{} essay, {} length", essay.essay_type, essay.length);
    let _ = writeln!(output, "\nOutline");
    let _ = writeln!(output, "  Introduction: {}", essay.outline.introduction);
    for point in &essay.outline.body_points {
        let _ = writeln!(output, "  - {point}");
    }
    let _ = writeln!(output, "  Conclusion: {}", essay.outline.conclusion);
    let _ = writeln!(output, "\nDraft\n{}", essay.draft);
    let _ = writeln!(output, "\nGrammar score: {}/100", essay.grammar_score);
    for issue in &essay.grammar_issues {
        let _ = writeln!(
            output,
            "  [{}] line {}: {}",
            issue.severity, issue.line_ref, issue.message
        );
    }
    let _ = writeln!(output, "\nCitations");
    for citation in &essay.citations {
        let _ = writeln!(output, "  {}", citation.formatted());
    }
}

fn write_concept(output: &mut String, concept: &ConceptExplanationBody) {
    let _ = writeln!(output, "{} level\n", concept.level);
    let _ = writeln!(output, "{}", concept.simple_explanation);
    for step in &concept.steps {
        let _ = writeln!(output, "\n{}. {}\n   {}", step.step, step.title, step.content);
    }
    let _ = writeln!(output, "\nAnalogy: {}", concept.analogy);
    let _ = writeln!(output, "Related: {}", concept.related_concepts.join(", "));
    for resource in &concept.resources {
        let _ = writeln!(output, "  {} <{}>", resource.title, resource.url);
    }
}

/// The item under the cursor, or `None` for kinds without navigation.
pub fn current_item(snapshot: &SessionSnapshot) -> Option<String> {
    let artifact = snapshot.artifact.as_ref()?;
    let index = snapshot.index;
    let total = snapshot.item_count;
    let mut output = String::new();

    match &artifact.body {
        ArtifactBody::Quiz(quiz) => {
            let question = quiz.questions.get(index)?;
            let _ = writeln!(
                output,
                "Question {} of {total} ({}% through) [{}]",
                index + 1,
                snapshot.progress_percent,
                question.question_type
            );
            let _ = writeln!(output, "{}", question.prompt);
            if let Some(options) = &question.options {
                write_options(&mut output, options);
            }
            write_answer_line(&mut output, snapshot, question.id);
            if snapshot.phase == Phase::Completed {
                let _ = writeln!(output, "Correct answer: {}", question.correct_answer);
                let _ = writeln!(output, "{}", question.explanation);
            }
        }
        ArtifactBody::PracticeTest(test) => {
            let question = test.questions.get(index)?;
            let clock = snapshot
                .remaining_secs
                .map_or_else(String::new, |secs| format!(" | {} left", format_clock(secs)));
            let _ = writeln!(output, "Question {} of {total}{clock}", index + 1);
            let _ = writeln!(output, "{}", question.prompt);
            write_options(&mut output, &question.options);
            write_answer_line(&mut output, snapshot, question.id);
            if snapshot.phase == Phase::Completed {
                let _ = writeln!(output, "Correct answer: {}", question.correct_answer);
            }
        }
        ArtifactBody::FlashcardSet(set) => {
            let card = set.cards.get(index)?;
            let (side, text) = if snapshot.flipped {
                ("back", &card.back)
            } else {
                ("front", &card.front)
            };
            let _ = writeln!(
                output,
                "Card {} of {total} ({}) [{side}]",
                index + 1,
                card.difficulty
            );
            let _ = writeln!(output, "{text}");
        }
        _ => return None,
    }

    Some(output)
}

fn write_options(output: &mut String, options: &[String]) {
    for (label, option) in OPTION_LABELS.chars().zip(options) {
        let _ = writeln!(output, "  {label}) {option}");
    }
}

fn write_answer_line(output: &mut String, snapshot: &SessionSnapshot, question_id: u32) {
    if let Some(answer) = snapshot.answers.get(&question_id) {
        let _ = writeln!(output, "Your answer: {answer}");
    }
}

/// Score headline and optional time taken.
pub fn score_summary(report: &ScoreReport, time_taken_secs: Option<u64>) -> String {
    let mut output = String::new();
    let verdict = match report.band {
        GradeBand::Strong => "Great work!",
        GradeBand::Passing => "Good effort.",
        GradeBand::NeedsWork => "Keep practicing.",
    };
    let _ = writeln!(
        output,
        "Score: {}/{} ({}%) {verdict}",
        report.correct, report.total, report.percent
    );
    let _ = writeln!(output, "Answered {} of {}", report.answered, report.total);
    if let Some(secs) = time_taken_secs {
        let _ = writeln!(output, "Time taken: {}", format_clock(secs));
    }
    output
}

/// Per-question breakdown.
pub fn review(report: &ScoreReport) -> String {
    let mut output = String::new();
    for (n, entry) in report.entries.iter().enumerate() {
        let mark = if entry.is_correct { "correct" } else { "wrong" };
        let _ = writeln!(output, "{}. {} [{mark}]", n + 1, entry.prompt);
        let _ = writeln!(output, "   Your answer: {}", entry.answer_display());
        if !entry.is_correct {
            let _ = writeln!(output, "   Correct answer: {}", entry.correct_answer);
        }
    }
    output
}

/// Score headline followed by the per-question breakdown, once graded.
pub fn results(snapshot: &SessionSnapshot) -> Option<String> {
    let report = snapshot.score.as_ref()?;
    let mut output = score_summary(report, snapshot.time_taken_secs);
    output.push_str(&review(report));
    Some(output)
}

/// A one-line message for events the prompt should announce.
pub fn event_line(event: &SessionEvent) -> Option<String> {
    match event {
        SessionEvent::Tick(tick) if ANNOUNCED_TICKS.contains(&tick.remaining_secs) => {
            Some(format!("[{} left]", format_clock(tick.remaining_secs)))
        }
        SessionEvent::TimeExpired => {
            Some("Time's up! Answers are locked. Type 'review' to see your results.".to_string())
        }
        SessionEvent::Error(error) => Some(format!("Error: {}", error.message)),
        _ => None,
    }
}

/// A notice for an error the user can act on.
pub fn notice(error: &StudyError) -> String {
    match error {
        StudyError::TestNotStarted => "Type 'start' to begin the test first.".to_string(),
        StudyError::AnswersLocked => {
            "Answers are locked. Type 'review' to see your results.".to_string()
        }
        other => other.user_message(),
    }
}
