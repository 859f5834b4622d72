//! Console log summaries
//!
//! A build's console text can be megabytes long. Callers get a bounded
//! summary instead: the first lines verbatim, a few keyword hits per
//! category, and a guess at the overall result taken from the terminal
//! `Finished: ...` marker Jenkins prints.

use serde::Serialize;
use std::fmt;

/// Substrings that mark a failure line (case-sensitive)
pub const FAILURE_KEYWORDS: &[&str] = &["ERROR", "Exception", "FATAL", "BUILD FAILED", "Traceback"];

/// Substrings that mark a success line (case-sensitive)
pub const SUCCESS_KEYWORDS: &[&str] = &["BUILD SUCCESS", "Tests passed", "All tests passed"];

const FINISHED_MARKER: &str = "Finished: ";

/// Size bounds of a summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryLimits {
    pub head_lines: usize,
    pub max_hits: usize,
    pub max_hit_chars: usize,
}

impl Default for SummaryLimits {
    fn default() -> Self {
        Self {
            head_lines: 20,
            max_hits: 5,
            max_hit_chars: 240,
        }
    }
}

/// Best guess at a build's outcome from its console text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallGuess {
    Success,
    Failure,
    Aborted,
    Unknown,
}

impl OverallGuess {
    fn from_marker(result: &str) -> Option<Self> {
        match result {
            "SUCCESS" => Some(Self::Success),
            "FAILURE" | "UNSTABLE" => Some(Self::Failure),
            "ABORTED" | "NOT_BUILT" => Some(Self::Aborted),
            _ => None,
        }
    }
}

impl fmt::Display for OverallGuess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
            Self::Aborted => "ABORTED",
            Self::Unknown => "UNKNOWN",
        };
        write!(f, "{}", label)
    }
}

/// A keyword match; `line` is 1-based
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineHit {
    pub line: usize,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogSummary {
    pub head_lines: Vec<String>,
    pub error_hits: Vec<LineHit>,
    pub success_hits: Vec<LineHit>,
    pub overall_guess: OverallGuess,
    pub total_lines: usize,
}

/// Summarize console text within `limits`
pub fn summarize(text: &str, limits: &SummaryLimits) -> LogSummary {
    let mut head_lines = Vec::with_capacity(limits.head_lines);
    let mut error_hits = Vec::new();
    let mut success_hits = Vec::new();
    let mut overall_guess = OverallGuess::Unknown;
    let mut total_lines = 0;

    for (index, line) in text.lines().enumerate() {
        total_lines += 1;

        if head_lines.len() < limits.head_lines {
            head_lines.push(line.to_string());
        }

        if error_hits.len() < limits.max_hits && contains_any(line, FAILURE_KEYWORDS) {
            error_hits.push(hit(index, line, limits.max_hit_chars));
        }
        if success_hits.len() < limits.max_hits && contains_any(line, SUCCESS_KEYWORDS) {
            success_hits.push(hit(index, line, limits.max_hit_chars));
        }

        if let Some(guess) = terminal_marker(line) {
            overall_guess = guess;
        }
    }

    LogSummary {
        head_lines,
        error_hits,
        success_hits,
        overall_guess,
        total_lines,
    }
}

fn contains_any(line: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| line.contains(kw))
}

fn hit(index: usize, line: &str, max_chars: usize) -> LineHit {
    LineHit {
        line: index + 1,
        content: line.trim().chars().take(max_chars).collect(),
    }
}

fn terminal_marker(line: &str) -> Option<OverallGuess> {
    let start = line.find(FINISHED_MARKER)? + FINISHED_MARKER.len();
    let result = line[start..]
        .split(|c: char| !(c.is_ascii_uppercase() || c == '_'))
        .next()?;
    OverallGuess::from_marker(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(text: &str) -> LogSummary {
        summarize(text, &SummaryLimits::default())
    }

    #[test]
    fn failure_with_error_hit() {
        let s = summary("line1\nERROR: bad\nFinished: FAILURE");
        assert_eq!(s.overall_guess, OverallGuess::Failure);
        assert_eq!(
            s.error_hits,
            vec![LineHit {
                line: 2,
                content: "ERROR: bad".into()
            }]
        );
        assert_eq!(s.head_lines.len(), 3);
        assert_eq!(s.total_lines, 3);
    }

    #[test]
    fn success_marker_and_hits() {
        let s = summary("Running tests\n  All tests passed  \n[INFO] BUILD SUCCESS\nFinished: SUCCESS\n");
        assert_eq!(s.overall_guess, OverallGuess::Success);
        assert_eq!(s.success_hits.len(), 2);
        assert_eq!(s.success_hits[0].content, "All tests passed");
        assert!(s.error_hits.is_empty());
    }

    #[test]
    fn no_marker_is_unknown() {
        assert_eq!(summary("still running\n").overall_guess, OverallGuess::Unknown);
        assert_eq!(summary("").overall_guess, OverallGuess::Unknown);
        assert_eq!(summary("").total_lines, 0);
    }

    #[test]
    fn last_marker_wins() {
        let text = "Finished: SUCCESS\nechoing an old log\nFinished: ABORTED";
        assert_eq!(summary(text).overall_guess, OverallGuess::Aborted);
    }

    #[test]
    fn marker_aliases() {
        assert_eq!(summary("Finished: UNSTABLE").overall_guess, OverallGuess::Failure);
        assert_eq!(summary("Finished: NOT_BUILT").overall_guess, OverallGuess::Aborted);
        assert_eq!(summary("Finished: WHATEVER").overall_guess, OverallGuess::Unknown);
    }

    #[test]
    fn keywords_are_case_sensitive() {
        let s = summary("error: lowercase\nexception thrown\nFATAL: upper");
        assert_eq!(s.error_hits.len(), 1);
        assert_eq!(s.error_hits[0].line, 3);
    }

    #[test]
    fn output_is_bounded() {
        let text: String = (0..1000).map(|i| format!("ERROR {} {}\n", i, "x".repeat(500))).collect();
        let s = summary(&text);
        assert_eq!(s.head_lines.len(), 20);
        assert_eq!(s.error_hits.len(), 5);
        assert!(s.error_hits.iter().all(|h| h.content.chars().count() <= 240));
        assert_eq!(s.error_hits[4].line, 5);
        assert_eq!(s.total_lines, 1000);
    }

    #[test]
    fn custom_limits() {
        let limits = SummaryLimits {
            head_lines: 1,
            max_hits: 1,
            max_hit_chars: 5,
        };
        let s = summarize("a\nERROR one\nERROR two", &limits);
        assert_eq!(s.head_lines, vec!["a"]);
        assert_eq!(s.error_hits, vec![LineHit { line: 2, content: "ERROR".into() }]);
    }

    #[test]
    fn guess_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&OverallGuess::Unknown).unwrap(), "\"UNKNOWN\"");
        assert_eq!(OverallGuess::Failure.to_string(), "FAILURE");
    }
}
