//! Keyword relevance scoring.
//!
//! Ranks the lines of a knowledge document against a question:
//!
//! 1. Lowercase the question, split it into `\w+` tokens, and drop stop-words.
//!    What remains is the keyword *set*.
//! 2. For every non-blank content line, count how many distinct keywords occur
//!    as substrings of the lowercased line.
//! 3. Keep lines with at least one hit, stable-sort by descending count, and
//!    return the first `max_lines` joined by `\n`.
//! 4. If no line hits, return the whole content trimmed.
//!
//! Matching is substring containment, not whole-word: the keyword `lab`
//! scores on a line mentioning `collaboration`.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::config::AnswerConfig;
use crate::models::ScoredLine;

static WORD_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\b\w+\b").ok());

/// Line scorer configured with a stop-word set and a line limit.
#[derive(Debug, Clone)]
pub struct Scorer {
    stop_words: HashSet<String>,
    max_lines: usize,
}

impl Scorer {
    pub fn new<I, S>(stop_words: I, max_lines: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            stop_words: stop_words
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .collect(),
            max_lines,
        }
    }

    pub fn from_config(config: &AnswerConfig) -> Self {
        Self::new(&config.stop_words, config.max_lines)
    }

    /// Distinct lowercased question tokens that are not stop-words.
    pub fn keywords(&self, question: &str) -> HashSet<String> {
        let lowered = question.to_lowercase();
        let Some(word_re) = WORD_RE.as_ref() else {
            return HashSet::new();
        };
        word_re
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|w| !self.stop_words.contains(*w))
            .map(str::to_string)
            .collect()
    }

    /// Lines of `content` with at least one keyword hit, best first.
    ///
    /// Ties keep their original order.
    pub fn score_lines<'a>(
        &self,
        keywords: &HashSet<String>,
        content: &'a str,
    ) -> Vec<ScoredLine<'a>> {
        let mut scored: Vec<ScoredLine<'a>> = content
            .split('\n')
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| {
                let lowered = line.to_lowercase();
                let matches = keywords
                    .iter()
                    .filter(|k| lowered.contains(k.as_str()))
                    .count();
                (matches > 0).then_some(ScoredLine { matches, line })
            })
            .collect();

        // `sort_by` is stable
        scored.sort_by(|a, b| b.matches.cmp(&a.matches));
        scored
    }

    /// Most relevant excerpt of `content` for `question`.
    ///
    /// Empty content gives an empty string; content with no matching line is
    /// returned whole (trimmed).
    pub fn find_relevant_answer(&self, question: &str, content: &str) -> String {
        if content.is_empty() {
            return String::new();
        }

        let keywords = self.keywords(question);
        let scored = self.score_lines(&keywords, content);

        if scored.is_empty() {
            return content.trim().to_string();
        }

        scored
            .iter()
            .take(self.max_lines)
            .map(|s| s.line)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for Scorer {
    fn default() -> Self {
        Self::from_config(&AnswerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_content_returns_empty() {
        let scorer = Scorer::default();
        assert_eq!(scorer.find_relevant_answer("anything", ""), "");
        assert_eq!(scorer.find_relevant_answer("", ""), "");
    }

    #[test]
    fn test_no_overlap_returns_trimmed_content() {
        let scorer = Scorer::default();
        assert_eq!(scorer.find_relevant_answer("xyz123", "Hello world"), "Hello world");
        assert_eq!(
            scorer.find_relevant_answer("xyz123", "\n  Hello\nworld  \n\n"),
            "Hello\nworld"
        );
    }

    #[test]
    fn test_whitespace_only_content_falls_back_to_empty() {
        let scorer = Scorer::default();
        assert_eq!(scorer.find_relevant_answer("fees", " \n\n \t"), "");
    }

    #[test]
    fn test_stop_words_are_removed() {
        let scorer = Scorer::default();
        let keywords = scorer.keywords("What is the fee?");
        assert_eq!(keywords, HashSet::from(["fee".to_string()]));

        let content = "The fee structure is posted.\nWhat is the plan? It is the one.";
        let scored = scorer.score_lines(&keywords, content);
        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].matches, 1);
        assert_eq!(scored[0].line, "The fee structure is posted.");
    }

    #[test]
    fn test_keywords_are_a_set() {
        let scorer = Scorer::default();
        let keywords = scorer.keywords("Labs labs LABS exams");
        assert_eq!(keywords.len(), 2);

        let scored = scorer.score_lines(&keywords, "labs and exams");
        assert_eq!(scored[0].matches, 2);
    }

    #[test]
    fn test_substring_containment_counts() {
        let scorer = Scorer::default();
        let keywords = scorer.keywords("lab");
        let scored = scorer.score_lines(&keywords, "Collaboration week");
        assert_eq!(scored.len(), 1);
    }

    #[test]
    fn test_ranks_by_match_count_and_caps_at_three() {
        let scorer = Scorer::default();
        let content = "\
Library opens at 9.
Exam schedule and library hours for exam week.
Sports day.
Exam hall rules.
Library card renewal.
Exam results and library fines.";
        let answer = scorer.find_relevant_answer("exam library", content);
        assert_eq!(
            answer,
            "Exam schedule and library hours for exam week.\nExam results and library fines.\nLibrary opens at 9."
        );
        assert_eq!(answer.lines().count(), 3);
    }

    #[test]
    fn test_ties_keep_original_order() {
        let scorer = Scorer::default();
        let content = "b fees\na fees\nc fees\nd fees";
        assert_eq!(scorer.find_relevant_answer("fees", content), "b fees\na fees\nc fees");
    }

    #[test]
    fn test_blank_lines_are_skipped_and_lines_kept_verbatim() {
        let scorer = Scorer::default();
        let content = "\n   \n  Fees are due in June.  \n";
        assert_eq!(
            scorer.find_relevant_answer("fees", content),
            "  Fees are due in June.  "
        );
    }

    #[test]
    fn test_stop_word_only_question_returns_content() {
        let scorer = Scorer::default();
        assert_eq!(
            scorer.find_relevant_answer("What is the?", "  Anything goes.  "),
            "Anything goes."
        );
    }

    #[test]
    fn test_custom_line_limit() {
        let scorer = Scorer::new(["the"], 1);
        assert_eq!(
            scorer.find_relevant_answer("the lab", "lab one\nlab two"),
            "lab one"
        );
    }
}
