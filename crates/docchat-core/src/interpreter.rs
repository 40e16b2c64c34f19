//! Classification of backend answers.
//!
//! The backend qualifies each answer with a confidence scalar. Two values are
//! sentinels rather than points on a scale: `0.0` means the backend could not
//! answer at all, and exactly `0.5` means the query was ambiguous and the
//! answer text enumerates alternative interpretations.

use crate::session::Message;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Confidence reported when the backend could not answer (out of scope,
/// retrieval failure, generation failure).
pub const FAILURE_CONFIDENCE: f64 = 0.0;

/// Confidence reported when the backend needs the reader to disambiguate.
pub const CLARIFICATION_CONFIDENCE: f64 = 0.5;

static OPTION_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\s+(\S.*)$").expect("option line pattern is valid"));

/// One enumerated interpretation offered by a clarification answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClarificationOption {
    /// The source line, trimmed (e.g. `"1. Option A"`).
    pub label: String,
    /// The line with its list marker stripped, used as the re-query text.
    pub query: String,
}

/// How a presentation shell should render an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "options")]
pub enum Interpretation {
    /// The backend could not answer; show the low-confidence indicator.
    Failure,
    /// The backend asks the reader to pick one of several interpretations.
    Clarification(Vec<ClarificationOption>),
    /// An ordinary answer.
    Normal,
}

impl Interpretation {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure)
    }

    /// Clarification options in source order, empty for other kinds.
    pub fn options(&self) -> &[ClarificationOption] {
        match self {
            Self::Clarification(options) => options,
            _ => &[],
        }
    }
}

/// Stateless classifier for `{text, confidence}` answers.
///
/// Classification is total and never fails: every confidence maps to exactly
/// one [`Interpretation`], and malformed clarification text degrades to
/// [`Interpretation::Normal`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseInterpreter;

impl ResponseInterpreter {
    pub fn new() -> Self {
        Self
    }

    /// Classifies a raw answer.
    ///
    /// Rules, first match wins:
    /// 1. confidence `<= 0.0` or NaN → `Failure`
    /// 2. confidence exactly `0.5` and at least one `N. text` line → `Clarification`
    /// 3. anything else → `Normal`
    pub fn interpret(&self, text: &str, confidence: f64) -> Interpretation {
        // NaN falls through `> 0.0`, which keeps it in the failure class.
        if !(confidence > FAILURE_CONFIDENCE) {
            return Interpretation::Failure;
        }

        if confidence == CLARIFICATION_CONFIDENCE {
            let options = Self::extract_options(text);
            if !options.is_empty() {
                return Interpretation::Clarification(options);
            }
            tracing::debug!("Clarification confidence without enumerated options");
        }

        Interpretation::Normal
    }

    /// Classifies a transcript message. User messages and messages without a
    /// confidence (greeting, failure notice) are `Normal`.
    pub fn interpret_message(&self, message: &Message) -> Interpretation {
        match message.confidence {
            Some(confidence) if !message.is_user() => self.interpret(&message.content, confidence),
            _ => Interpretation::Normal,
        }
    }

    /// Parses every line starting with `<integer>. ` into an option,
    /// preserving source order.
    pub fn extract_options(text: &str) -> Vec<ClarificationOption> {
        text.lines()
            .map(str::trim)
            .filter_map(|line| {
                let captures = OPTION_LINE.captures(line)?;
                Some(ClarificationOption {
                    label: line.to_string(),
                    query: captures[1].trim().to_string(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(interpretation: &Interpretation) -> Vec<&str> {
        interpretation
            .options()
            .iter()
            .map(|option| option.label.as_str())
            .collect()
    }

    #[test]
    fn test_classification_is_total_over_sentinels() {
        let interpreter = ResponseInterpreter::new();
        let list = "1. Option A\n2. Option B";

        assert_eq!(interpreter.interpret("n/a", 0.0), Interpretation::Failure);
        assert!(matches!(
            interpreter.interpret(list, 0.5),
            Interpretation::Clarification(_)
        ));
        assert_eq!(interpreter.interpret("plain prose", 0.5), Interpretation::Normal);
        assert_eq!(interpreter.interpret(list, 0.35), Interpretation::Normal);
        assert_eq!(interpreter.interpret(list, 0.9), Interpretation::Normal);
    }

    #[test]
    fn test_extracts_trimmed_options_in_order() {
        let interpreter = ResponseInterpreter::new();
        let result = interpreter.interpret("1. Option A\n2. Option B", 0.5);
        assert_eq!(labels(&result), vec!["1. Option A", "2. Option B"]);

        let queries: Vec<&str> = result.options().iter().map(|o| o.query.as_str()).collect();
        assert_eq!(queries, vec!["Option A", "Option B"]);
    }

    #[test]
    fn test_options_embedded_in_prose() {
        let text = "Did you mean one of these?\n\n   1. ROS 2 nodes  \n  2. Node.js modules\nPick one.";
        let options = ResponseInterpreter::extract_options(text);
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].label, "1. ROS 2 nodes");
        assert_eq!(options[1].query, "Node.js modules");
    }

    #[test]
    fn test_non_list_lines_are_ignored() {
        let options = ResponseInterpreter::extract_options("1.5 is a number\n3.Missing space\n- bullet");
        assert!(options.is_empty());
    }

    #[test]
    fn test_degenerate_confidences() {
        let interpreter = ResponseInterpreter::new();
        assert!(interpreter.interpret("x", f64::NAN).is_failure());
        assert!(interpreter.interpret("x", -0.1).is_failure());
        assert_eq!(interpreter.interpret("x", 1.0), Interpretation::Normal);
    }

    #[test]
    fn test_interpret_message_ignores_user_messages() {
        let interpreter = ResponseInterpreter::new();
        let mut message = Message::user("1. Option A");
        message.confidence = Some(0.5);
        assert_eq!(interpreter.interpret_message(&message), Interpretation::Normal);

        let answer = Message::answer("Sorry", Vec::new(), 0.0);
        assert!(interpreter.interpret_message(&answer).is_failure());
    }
}
