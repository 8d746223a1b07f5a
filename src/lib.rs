//! # Student QA
//!
//! A small question-answering service for students. Answers are pre-written
//! text kept in one file per academic year (`year1.txt` … `year4.txt`); a
//! question is matched to the most relevant lines by keyword overlap.
//!
//! ## Architecture
//!
//! ```text
//!   POST /chat ─┐
//!   sqa ask ────┴─▶ Question ─▶ Year Detector ─▶ Knowledge Loader ─▶ Scorer ─▶ Answer
//!
//!   sqa ingest ───▶ File Scanner ─▶ SQLite documents ─▶ (OpenAI embeddings)
//! ```
//!
//! The two flows share configuration only. Requests read the knowledge files
//! fresh every time; the ingestion store is built for future semantic search
//! and is not consulted when answering.
//!
//! ## Quick Start
//!
//! ```bash
//! sqa sources                           # which year files are present
//! sqa ask "What are 2nd year subjects?"
//! sqa serve                             # http://0.0.0.0:5000
//! sqa ingest --dry-run
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`year`] | Year detection |
//! | [`knowledge`] | Per-year knowledge loading |
//! | [`scorer`] | Keyword relevance scoring |
//! | [`assistant`] | Response assembly |
//! | [`server`] | HTTP chat server |
//! | [`sources`] | Knowledge file status |
//! | [`connector_fs`] | Knowledge file scanner for ingestion |
//! | [`ingest`] | Ingestion into the SQLite store |
//! | [`embedding`] | Embedding providers |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |

pub mod assistant;
pub mod config;
pub mod connector_fs;
pub mod db;
pub mod embedding;
pub mod ingest;
pub mod knowledge;
pub mod migrate;
pub mod models;
pub mod scorer;
pub mod server;
pub mod sources;
pub mod year;
