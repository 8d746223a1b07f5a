//! Knowledge file scanner for ingestion.
//!
//! Lists the files directly under the knowledge root whose names match
//! `[ingest].include_globs`, reads them, and drops the empty ones.

use anyhow::{bail, Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use walkdir::WalkDir;

use crate::config::Config;
use crate::knowledge::read_knowledge_file;
use crate::models::YearFile;

pub fn scan_year_files(config: &Config) -> Result<Vec<YearFile>> {
    let root = &config.knowledge.root;
    if !root.is_dir() {
        bail!("Knowledge root does not exist: {}", root.display());
    }

    let include_set = build_globset(&config.ingest.include_globs)?;
    let mut files = Vec::new();

    for entry in WalkDir::new(root).min_depth(1).max_depth(1) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_string();
        if !include_set.is_match(&name) {
            continue;
        }

        let path = entry.path();
        let content = read_knowledge_file(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let body = content.trim();
        if body.is_empty() {
            tracing::debug!(file = %name, "skipping empty knowledge file");
            continue;
        }

        let id = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or(name);

        files.push(YearFile {
            id,
            path: path.to_path_buf(),
            body: body.to_string(),
        });
    }

    // Sort for deterministic ordering
    files.sort_by(|a, b| a.id.cmp(&b.id));

    Ok(files)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_scans_matching_non_empty_files() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("year2.txt"), "  Second year notes \n").unwrap();
        fs::write(tmp.path().join("year1.txt"), "First year notes").unwrap();
        fs::write(tmp.path().join("year3.txt"), " \n\n").unwrap();
        fs::write(tmp.path().join("readme.md"), "not knowledge").unwrap();
        fs::create_dir(tmp.path().join("archive")).unwrap();
        fs::write(tmp.path().join("archive/year4.txt"), "old").unwrap();

        let files = scan_year_files(&Config::minimal(tmp.path())).unwrap();
        let ids: Vec<&str> = files.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["year1", "year2"]);
        assert_eq!(files[1].body, "Second year notes");
    }

    #[test]
    fn test_crlf_bodies_are_normalised() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("year1.txt"), "Labs: C lab\r\nFees: June\r\n").unwrap();

        let files = scan_year_files(&Config::minimal(tmp.path())).unwrap();
        assert_eq!(files[0].body, "Labs: C lab\nFees: June");
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let err = scan_year_files(&Config::minimal("/no/such/dir")).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
