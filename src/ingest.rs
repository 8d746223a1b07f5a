//! Offline ingestion of knowledge files into the SQLite store.
//!
//! Scans the knowledge root, upserts one document per non-empty file into
//! `[ingest].collection`, and embeds the documents when a provider is
//! configured. Embedding failures are non-fatal: documents are kept and the
//! missing vectors are reported as pending. The request path never reads
//! this store.

use anyhow::{bail, Result};
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;

use crate::config::Config;
use crate::connector_fs;
use crate::db;
use crate::embedding::{self, OpenAIProvider};
use crate::migrate;
use crate::models::YearFile;

/// Counts reported at the end of an ingest run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestStats {
    pub documents_upserted: u64,
    pub embeddings_written: u64,
    pub embeddings_pending: u64,
}

pub async fn run_ingest(config: &Config, dry_run: bool) -> Result<()> {
    let files = connector_fs::scan_year_files(config)?;

    if files.is_empty() {
        bail!("No year-wise text files found or files are empty.");
    }

    if dry_run {
        println!("ingest {} (dry-run)", config.ingest.collection);
        println!("  documents found: {}", files.len());
        for file in &files {
            println!("  {} ({} bytes)", file.id, file.body.len());
        }
        return Ok(());
    }

    let provider = match embedding::create_provider(&config.embedding) {
        Ok(provider) => provider,
        Err(e) => {
            tracing::warn!(error = %e, "could not create embedding provider");
            None
        }
    };

    let pool = db::connect(config).await?;
    migrate::create_schema(&pool).await?;

    let stats = ingest_files(&pool, config, &files, provider.as_ref()).await?;

    println!("ingest {}", config.ingest.collection);
    println!("  upserted documents: {}", stats.documents_upserted);
    if config.embedding.is_enabled() {
        println!("  embeddings written: {}", stats.embeddings_written);
        println!("  embeddings pending: {}", stats.embeddings_pending);
    }
    println!("ok");

    pool.close().await;
    Ok(())
}

/// Stores `files` and, when `provider` is given, their embeddings.
///
/// With embeddings enabled but no provider (for example a missing API key),
/// every document is counted as pending.
pub async fn ingest_files(
    pool: &SqlitePool,
    config: &Config,
    files: &[YearFile],
    provider: Option<&OpenAIProvider>,
) -> Result<IngestStats> {
    let collection = &config.ingest.collection;
    let mut stats = IngestStats::default();

    for file in files {
        upsert_document(pool, collection, file).await?;
        stats.documents_upserted += 1;
    }

    match provider {
        Some(provider) => {
            let (written, pending) = embed_documents(pool, collection, provider, files).await;
            stats.embeddings_written = written;
            stats.embeddings_pending = pending;
        }
        None if config.embedding.is_enabled() => {
            stats.embeddings_pending = files.len() as u64;
        }
        None => {}
    }

    tracing::info!(
        collection = %collection,
        documents = stats.documents_upserted,
        embeddings = stats.embeddings_written,
        pending = stats.embeddings_pending,
        "ingest finished"
    );

    Ok(stats)
}

fn content_hash(body: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body.as_bytes());
    format!("{:x}", hasher.finalize())
}

async fn upsert_document(pool: &SqlitePool, collection: &str, file: &YearFile) -> Result<()> {
    let metadata = serde_json::json!({ "year": file.id }).to_string();
    let now = chrono::Utc::now().timestamp();

    sqlx::query(
        r#"
        INSERT INTO documents (collection, id, source_path, body, metadata_json, content_hash, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(collection, id) DO UPDATE SET
            source_path = excluded.source_path,
            body = excluded.body,
            metadata_json = excluded.metadata_json,
            content_hash = excluded.content_hash,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(collection)
    .bind(&file.id)
    .bind(file.path.display().to_string())
    .bind(&file.body)
    .bind(&metadata)
    .bind(content_hash(&file.body))
    .bind(now)
    .execute(pool)
    .await?;

    Ok(())
}

/// Embeds all documents in one batch. Returns `(written, pending)`.
async fn embed_documents(
    pool: &SqlitePool,
    collection: &str,
    provider: &OpenAIProvider,
    files: &[YearFile],
) -> (u64, u64) {
    let total = files.len() as u64;

    let texts: Vec<String> = files.iter().map(|f| f.body.clone()).collect();
    let vectors = match provider.embed(&texts).await {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "embedding batch failed");
            return (0, total);
        }
    };

    let mut written = 0u64;
    for (file, vector) in files.iter().zip(vectors.iter()) {
        let stored = sqlx::query(
            r#"
            INSERT INTO embeddings (collection, document_id, model, dims, content_hash, embedding, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(collection, document_id) DO UPDATE SET
                model = excluded.model,
                dims = excluded.dims,
                content_hash = excluded.content_hash,
                embedding = excluded.embedding,
                created_at = excluded.created_at
            "#,
        )
        .bind(collection)
        .bind(&file.id)
        .bind(provider.model_name())
        .bind(provider.dims() as i64)
        .bind(content_hash(&file.body))
        .bind(embedding::vec_to_blob(vector))
        .bind(chrono::Utc::now().timestamp())
        .execute(pool)
        .await;

        match stored {
            Ok(_) => written += 1,
            Err(e) => tracing::warn!(document = %file.id, error = %e, "failed to store embedding"),
        }
    }

    (written, total - written)
}
