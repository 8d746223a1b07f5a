//! Core data types shared by the retrieval and ingestion flows.

use std::fmt;

/// An academic year category. Only `1..=4` can be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Year(u8);

impl Year {
    /// All years in search order.
    pub const ALL: [Year; 4] = [Year(1), Year(2), Year(3), Year(4)];

    pub fn new(n: u8) -> Option<Self> {
        (1..=4).contains(&n).then_some(Self(n))
    }

    pub fn number(self) -> u8 {
        self.0
    }

    /// Name of the backing knowledge file, e.g. `year2.txt`.
    pub fn file_name(self) -> String {
        format!("year{}.txt", self.0)
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Knowledge text for one year, read in full from storage.
///
/// A missing file and an empty file are both represented by empty
/// `content`; callers that care about the difference ask the
/// [`KnowledgeSource`](crate::knowledge::KnowledgeSource) directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeDocument {
    pub year: Year,
    pub content: String,
}

impl KnowledgeDocument {
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// A validated, non-blank question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question(String);

impl Question {
    /// Trims the raw input; returns `None` when nothing is left.
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        let trimmed = raw.unwrap_or_default().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A content line paired with the number of distinct keywords it contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredLine<'a> {
    pub matches: usize,
    pub line: &'a str,
}

/// The reply produced for a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// Relevant text from the year the question named.
    Year { year: Year, text: String },
    /// Relevant text gathered from every year that had some, in year order.
    Global(Vec<(Year, String)>),
    /// Nothing relevant anywhere.
    Fallback(String),
}

impl Answer {
    /// Renders the reply text sent to the user.
    pub fn text(&self) -> String {
        match self {
            Answer::Year { text, .. } => text.clone(),
            Answer::Global(blocks) => blocks
                .iter()
                .map(|(year, text)| format!("[Year {}]\n{}", year, text))
                .collect::<Vec<_>>()
                .join("\n\n"),
            Answer::Fallback(message) => message.clone(),
        }
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Answer::Year { .. } => "year",
            Answer::Global(_) => "global",
            Answer::Fallback(_) => "fallback",
        }
    }
}

/// A knowledge file picked up by the ingestion scanner.
#[derive(Debug, Clone)]
pub struct YearFile {
    /// File stem, used as document id (`year1`).
    pub id: String,
    pub path: std::path::PathBuf,
    /// Trimmed file content; never empty.
    pub body: String,
}
