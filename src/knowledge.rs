//! Knowledge loading.
//!
//! [`KnowledgeSource`] is the storage seam: anything that can hand back the
//! full text for a [`Year`]. [`FsKnowledgeBase`] reads `year{n}.txt` files
//! from a directory on every call; nothing is cached.
//!
//! Absence is normal. A missing file yields an empty document, and so does
//! any other read failure (logged at `warn`), so a broken file never fails a
//! request.
//!
//! Line endings are normalised on read: `\r\n` and lone `\r` become `\n`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::models::{KnowledgeDocument, Year};

/// Reads a knowledge file as UTF-8 with line endings normalised to `\n`.
pub fn read_knowledge_file(path: &Path) -> std::io::Result<String> {
    std::fs::read_to_string(path).map(|content| normalize_newlines(&content))
}

/// Rewrites `\r\n` and lone `\r` as `\n`.
pub fn normalize_newlines(text: &str) -> String {
    if !text.contains('\r') {
        return text.to_string();
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Read-only access to per-year knowledge text.
pub trait KnowledgeSource: Send + Sync {
    /// Whether any content is stored for `year` (an empty file counts).
    fn exists(&self, year: Year) -> bool;

    /// Full text for `year`; empty when absent or unreadable.
    fn read(&self, year: Year) -> String;

    fn load(&self, year: Year) -> KnowledgeDocument {
        KnowledgeDocument {
            year,
            content: self.read(year),
        }
    }
}

/// Knowledge files in a directory, one per year.
#[derive(Debug, Clone)]
pub struct FsKnowledgeBase {
    root: PathBuf,
}

impl FsKnowledgeBase {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, year: Year) -> PathBuf {
        self.root.join(year.file_name())
    }
}

impl KnowledgeSource for FsKnowledgeBase {
    fn exists(&self, year: Year) -> bool {
        self.path_for(year).is_file()
    }

    fn read(&self, year: Year) -> String {
        let path = self.path_for(year);
        match read_knowledge_file(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
            Err(e) => {
                tracing::warn!(
                    year = year.number(),
                    path = %path.display(),
                    error = %e,
                    "failed to read knowledge file, treating as empty"
                );
                String::new()
            }
        }
    }
}
