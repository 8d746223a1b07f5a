//! TOML configuration parsing and validation.
//!
//! Every setting the request path depends on (knowledge root, stop-words,
//! fallback message, line limit) lives here and is handed to
//! [`Assistant::new`](crate::assistant::Assistant::new) at startup. The
//! `[db]`, `[ingest]` and `[embedding]` sections are only read by the
//! offline `sqa ingest` command.
//!
//! ```toml
//! [knowledge]
//! root = "./knowledge_base"
//!
//! [server]
//! bind = "0.0.0.0:5000"
//!
//! [db]
//! path = "./data/sqa.sqlite"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default reply when no knowledge file yields relevant text.
pub const DEFAULT_FALLBACK_MESSAGE: &str = "I'm not sure I understand. Could you please rephrase your question or mention your year (1st, 2nd, 3rd, or 4th year)?";

/// Function words ignored when extracting keywords from a question.
pub const DEFAULT_STOP_WORDS: &[&str] = &[
    "what", "is", "are", "the", "a", "an", "how", "when", "where", "why", "should", "i", "am",
    "do", "does", "can", "could",
];

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub knowledge: KnowledgeConfig,
    #[serde(default)]
    pub answer: AnswerConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub db: DbConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct KnowledgeConfig {
    /// Directory holding `year1.txt` … `year4.txt`.
    pub root: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnswerConfig {
    #[serde(default = "default_max_lines")]
    pub max_lines: usize,
    #[serde(default = "default_fallback_message")]
    pub fallback_message: String,
    #[serde(default = "default_stop_words")]
    pub stop_words: Vec<String>,
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self {
            max_lines: default_max_lines(),
            fallback_message: default_fallback_message(),
            stop_words: default_stop_words(),
        }
    }
}

fn default_max_lines() -> usize {
    3
}
fn default_fallback_message() -> String {
    DEFAULT_FALLBACK_MESSAGE.to_string()
}
fn default_stop_words() -> Vec<String> {
    DEFAULT_STOP_WORDS.iter().map(|w| w.to_string()).collect()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:5000".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./data/sqa.sqlite")
}

#[derive(Debug, Deserialize, Clone)]
pub struct IngestConfig {
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            collection: default_collection(),
            include_globs: default_include_globs(),
        }
    }
}

fn default_collection() -> String {
    "vardhaman-docs".to_string()
}
fn default_include_globs() -> Vec<String> {
    vec!["year*.txt".to_string()]
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub dims: Option<usize>,
    /// API root; requests go to `{base_url}/embeddings`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each further attempt.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            dims: None,
            base_url: default_base_url(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_provider() -> String {
    "disabled".to_string()
}
fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_max_retries() -> u32 {
    5
}
fn default_retry_backoff_ms() -> u64 {
    1000
}
fn default_timeout_secs() -> u64 {
    30
}

impl EmbeddingConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

impl Config {
    /// Configuration with every optional section at its default, rooted at
    /// the given knowledge directory.
    pub fn minimal(knowledge_root: impl Into<PathBuf>) -> Self {
        Self {
            knowledge: KnowledgeConfig {
                root: knowledge_root.into(),
            },
            answer: AnswerConfig::default(),
            server: ServerConfig::default(),
            db: DbConfig::default(),
            ingest: IngestConfig::default(),
            embedding: EmbeddingConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.answer.max_lines == 0 {
        anyhow::bail!("answer.max_lines must be >= 1");
    }

    if config.answer.fallback_message.trim().is_empty() {
        anyhow::bail!("answer.fallback_message must not be empty");
    }

    if config.ingest.include_globs.is_empty() {
        anyhow::bail!("ingest.include_globs must list at least one pattern");
    }

    if config.embedding.is_enabled() {
        if config.embedding.dims.is_none() || config.embedding.dims == Some(0) {
            anyhow::bail!(
                "embedding.dims must be > 0 when provider is '{}'",
                config.embedding.provider
            );
        }
        if config.embedding.model.is_none() {
            anyhow::bail!(
                "embedding.model must be specified when provider is '{}'",
                config.embedding.provider
            );
        }
        let base_url = &config.embedding.base_url;
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            anyhow::bail!("embedding.base_url must be an http(s) URL, got '{}'", base_url);
        }
    }

    match config.embedding.provider.as_str() {
        "disabled" | "openai" => {}
        other => anyhow::bail!(
            "Unknown embedding provider: '{}'. Must be disabled or openai.",
            other
        ),
    }

    Ok(())
}
