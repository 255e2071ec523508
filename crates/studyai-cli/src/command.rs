//! Commands accepted by the interactive study prompt.

use std::str::FromStr;

/// One line typed at the study prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudyCommand {
    /// Begin review (starts the clock on practice tests).
    Start,
    /// Next item.
    Next,
    /// Previous item.
    Prev,
    /// Jump to a zero-based item index.
    Goto(usize),
    /// Answer the question under the cursor.
    Answer(String),
    /// Turn the current flashcard over.
    Flip,
    /// Lock answers and grade.
    Submit,
    /// Show the graded breakdown.
    Review,
    /// Print the whole artifact again.
    Show,
    /// Discard the session.
    Reset,
    /// Generate a new artifact on another subject.
    New(String),
    /// List commands.
    Help,
    /// Leave the prompt.
    Quit,
}

impl FromStr for StudyCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(w, r)| (w, r.trim()));

        match word.to_lowercase().as_str() {
            "start" | "s" => Ok(Self::Start),
            "next" | "n" => Ok(Self::Next),
            "prev" | "p" => Ok(Self::Prev),
            "goto" | "g" => {
                let position: usize = rest
                    .parse()
                    .map_err(|_| format!("goto needs an item number, got '{rest}'"))?;
                position
                    .checked_sub(1)
                    .map(Self::Goto)
                    .ok_or_else(|| "Items are numbered from 1".to_string())
            }
            "answer" | "a" if rest.is_empty() => Err("answer needs a value".to_string()),
            "answer" | "a" => Ok(Self::Answer(rest.to_string())),
            "flip" | "f" => Ok(Self::Flip),
            "submit" => Ok(Self::Submit),
            "review" | "r" => Ok(Self::Review),
            "show" => Ok(Self::Show),
            "reset" => Ok(Self::Reset),
            "new" if rest.is_empty() => Err("new needs a subject".to_string()),
            "new" => Ok(Self::New(rest.to_string())),
            "help" | "h" | "?" => Ok(Self::Help),
            "quit" | "q" | "exit" => Ok(Self::Quit),
            "" => Err(String::new()),
            other => Err(format!("Unknown command '{other}'. Type 'help' for a list.")),
        }
    }
}

/// Text printed for `help`.
pub const HELP: &str = "\
Commands:
  start            begin (starts the clock on practice tests)
  next | prev      move between questions or cards
  goto N           jump to item N
  answer VALUE     answer the current question
  flip             turn the current card over
  submit           lock answers and show the score
  review           show the graded breakdown
  show             print the whole artifact again
  reset            discard this session
  new SUBJECT      generate a new one (after reset)
  quit             leave";

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!("start".parse::<StudyCommand>().unwrap(), StudyCommand::Start);
        assert_eq!("  NEXT ".parse::<StudyCommand>().unwrap(), StudyCommand::Next);
        assert_eq!("q".parse::<StudyCommand>().unwrap(), StudyCommand::Quit);
    }

    #[test]
    fn test_goto_is_one_based() {
        assert_eq!("goto 3".parse::<StudyCommand>().unwrap(), StudyCommand::Goto(2));
        assert!("goto 0".parse::<StudyCommand>().is_err());
        assert!("goto three".parse::<StudyCommand>().is_err());
    }

    #[test]
    fn test_answer_keeps_spacing_inside_value() {
        assert_eq!(
            "answer   Option  B ".parse::<StudyCommand>().unwrap(),
            StudyCommand::Answer("Option  B".to_string())
        );
        assert!("answer".parse::<StudyCommand>().is_err());
    }

    #[test]
    fn test_new_requires_subject() {
        assert_eq!(
            "new cell biology".parse::<StudyCommand>().unwrap(),
            StudyCommand::New("cell biology".to_string())
        );
        assert!("new".parse::<StudyCommand>().is_err());
    }

    #[test]
    fn test_unknown_command() {
        let err = "dance".parse::<StudyCommand>().unwrap_err();
        assert!(err.contains("dance"));
        assert_eq!("".parse::<StudyCommand>().unwrap_err(), "");
    }
}
