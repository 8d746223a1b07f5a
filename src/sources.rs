use anyhow::Result;

use crate::config::Config;
use crate::knowledge::{FsKnowledgeBase, KnowledgeSource};
use crate::models::Year;

/// Status of one year's knowledge file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceStatus {
    pub year: Year,
    pub exists: bool,
    /// Non-blank lines; these are the lines the scorer ranks.
    pub lines: usize,
}

pub fn source_statuses(kb: &dyn KnowledgeSource) -> Vec<SourceStatus> {
    Year::ALL
        .into_iter()
        .map(|year| {
            let doc = kb.load(year);
            SourceStatus {
                year,
                exists: kb.exists(year),
                lines: doc.content.lines().filter(|l| !l.trim().is_empty()).count(),
            }
        })
        .collect()
}

pub fn list_sources(config: &Config) -> Result<()> {
    let kb = FsKnowledgeBase::new(&config.knowledge.root);

    println!("knowledge root: {}", kb.root().display());
    println!("{:<8} {:<12} {:<8} LINES", "YEAR", "FILE", "STATUS");
    for status in source_statuses(&kb) {
        let label = match (status.exists, status.lines) {
            (false, _) => "MISSING",
            (true, 0) => "EMPTY",
            (true, _) => "OK",
        };
        println!(
            "{:<8} {:<12} {:<8} {}",
            status.year,
            status.year.file_name(),
            label,
            status.lines
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_statuses_distinguish_missing_and_empty() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("year1.txt"), "a\n\nb\n").unwrap();
        fs::write(tmp.path().join("year2.txt"), "").unwrap();

        let statuses = source_statuses(&FsKnowledgeBase::new(tmp.path()));
        let summary: Vec<(u8, bool, usize)> = statuses
            .iter()
            .map(|s| (s.year.number(), s.exists, s.lines))
            .collect();
        assert_eq!(
            summary,
            vec![(1, true, 2), (2, true, 0), (3, false, 0), (4, false, 0)]
        );
    }
}
