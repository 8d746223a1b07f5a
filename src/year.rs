//! Year detection.
//!
//! Finds which academic year a question is about by whole-word matching
//! against a fixed synonym list per year. Years are tried in order 1→4 and
//! the first hit wins, so a question naming two years resolves to the lower.

use regex::Regex;
use std::sync::LazyLock;

use crate::models::Year;

const YEAR_PATTERNS: [(u8, &str); 4] = [
    (1, r"(?i)\b(1st|first|one|year\s*1)\b"),
    (2, r"(?i)\b(2nd|second|two|year\s*2)\b"),
    (3, r"(?i)\b(3rd|third|three|year\s*3)\b"),
    (4, r"(?i)\b(4th|fourth|four|year\s*4)\b"),
];

static YEAR_REGEXES: LazyLock<Vec<(Year, Regex)>> = LazyLock::new(|| {
    YEAR_PATTERNS
        .iter()
        .filter_map(|(n, pattern)| Some((Year::new(*n)?, Regex::new(pattern).ok()?)))
        .collect()
});

/// Returns the year mentioned in `question`, or `None` if no year is named.
pub fn detect_year(question: &str) -> Option<Year> {
    YEAR_REGEXES
        .iter()
        .find(|(_, re)| re.is_match(question))
        .map(|(year, _)| *year)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(q: &str) -> u8 {
        detect_year(q).map(Year::number).unwrap_or(0)
    }

    #[test]
    fn test_all_patterns_compile() {
        assert_eq!(YEAR_REGEXES.len(), 4);
    }

    #[test]
    fn test_ordinal_markers() {
        assert_eq!(detect("What are 1st year subjects?"), 1);
        assert_eq!(detect("What are 2nd year subjects?"), 2);
        assert_eq!(detect("exam dates for 3rd years"), 3);
        assert_eq!(detect("4th year internship"), 4);
    }

    #[test]
    fn test_word_markers_case_insensitive() {
        assert_eq!(detect("FIRST semester labs"), 1);
        assert_eq!(detect("Second year fees"), 2);
        assert_eq!(detect("year THREE projects"), 3);
        assert_eq!(detect("Fourth year electives"), 4);
    }

    #[test]
    fn test_year_number_with_optional_space() {
        assert_eq!(detect("timetable for year 3"), 3);
        assert_eq!(detect("timetable for year3"), 3);
        assert_eq!(detect("Year  2 syllabus"), 2);
    }

    #[test]
    fn test_requires_whole_words() {
        assert_eq!(detect("someone asked about fees"), 0);
        assert_eq!(detect("network topology"), 0);
        assert_eq!(detect("21st century skills"), 0);
        assert_eq!(detect("year 12 results"), 0);
    }

    #[test]
    fn test_no_marker_is_none() {
        assert!(detect_year("Tell me about labs").is_none());
        assert!(detect_year("").is_none());
    }

    #[test]
    fn test_lowest_year_wins() {
        assert_eq!(detect("compare 4th and 1st year"), 1);
        assert_eq!(detect("third or second year?"), 2);
    }
}
