//! OpenAI-compatible embeddings for the ingestion store.
//!
//! [`create_provider`] returns `None` when `[embedding].provider = "disabled"`,
//! so callers decide once whether vectors are produced at all. An
//! [`OpenAIProvider`] posts batches to `{base_url}/embeddings` and needs
//! `OPENAI_API_KEY` in the environment.
//!
//! Vectors are stored as little-endian `f32` BLOBs (see [`vec_to_blob`]).
//!
//! # Retry Strategy
//!
//! - HTTP 429 and 5xx, network errors → retry, up to `max_retries` times
//! - any other non-success status, or a malformed body → fail immediately
//! - delay starts at `retry_backoff_ms` and doubles per attempt (capped at 32×)

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::EmbeddingConfig;

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Deserialize)]
struct EmbeddingItem {
    index: usize,
    embedding: Vec<f32>,
}

/// How a single request attempt failed.
enum AttemptError {
    /// Worth retrying: rate limit, server error, or transport failure.
    Transient(anyhow::Error),
    Fatal(anyhow::Error),
}

pub struct OpenAIProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    dims: usize,
    max_retries: u32,
    backoff: Duration,
}

impl OpenAIProvider {
    /// Reads the API key from `OPENAI_API_KEY`.
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow!("OPENAI_API_KEY environment variable not set"))?;
        Self::with_api_key(config, api_key)
    }

    pub fn with_api_key(config: &EmbeddingConfig, api_key: impl Into<String>) -> Result<Self> {
        let model = config
            .model
            .clone()
            .ok_or_else(|| anyhow!("embedding.model required for OpenAI provider"))?;
        let dims = config
            .dims
            .ok_or_else(|| anyhow!("embedding.dims required for OpenAI provider"))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", config.base_url.trim_end_matches('/')),
            api_key: api_key.into(),
            model,
            dims,
            max_retries: config.max_retries,
            backoff: Duration::from_millis(config.retry_backoff_ms),
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Embeds `texts`, returning one vector per input in input order.
    pub async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let request = EmbeddingRequest {
            model: &self.model,
            input: texts,
        };

        let mut attempt = 0u32;
        loop {
            match self.send_once(&request).await {
                Ok(response) => return self.unpack(response, texts.len()),
                Err(AttemptError::Fatal(e)) => return Err(e),
                Err(AttemptError::Transient(e)) if attempt >= self.max_retries => {
                    return Err(e.context(format!(
                        "embedding request to {} failed after {} attempts",
                        self.endpoint,
                        attempt + 1
                    )));
                }
                Err(AttemptError::Transient(e)) => {
                    attempt += 1;
                    let delay = self.backoff * (1u32 << (attempt - 1).min(5));
                    tracing::debug!(attempt, ?delay, error = %e, "retrying embedding request");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    async fn send_once(
        &self,
        request: &EmbeddingRequest<'_>,
    ) -> std::result::Result<EmbeddingResponse, AttemptError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| AttemptError::Transient(e.into()))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<EmbeddingResponse>()
                .await
                .context("Invalid embeddings response body")
                .map_err(AttemptError::Fatal);
        }

        let body = response.text().await.unwrap_or_default();
        let err = anyhow!("embeddings API error {}: {}", status, body);
        if status.as_u16() == 429 || status.is_server_error() {
            Err(AttemptError::Transient(err))
        } else {
            Err(AttemptError::Fatal(err))
        }
    }

    fn unpack(&self, response: EmbeddingResponse, expected: usize) -> Result<Vec<Vec<f32>>> {
        let mut items = response.data;
        if items.len() != expected {
            bail!(
                "Invalid embeddings response: expected {} embeddings, got {}",
                expected,
                items.len()
            );
        }
        if let Some(item) = items.iter().find(|i| i.embedding.len() != self.dims) {
            bail!(
                "Invalid embeddings response: expected {} dims, got {}",
                self.dims,
                item.embedding.len()
            );
        }

        items.sort_by_key(|i| i.index);
        Ok(items.into_iter().map(|i| i.embedding).collect())
    }
}

/// Builds the configured provider, or `None` when embeddings are disabled.
pub fn create_provider(config: &EmbeddingConfig) -> Result<Option<OpenAIProvider>> {
    match config.provider.as_str() {
        "disabled" => Ok(None),
        "openai" => Ok(Some(OpenAIProvider::new(config)?)),
        other => bail!("Unknown embedding provider: {}", other),
    }
}

/// Encodes a vector as little-endian `f32` bytes (`len × 4`).
pub fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vec.len() * 4);
    for &v in vec {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}


#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use std::sync::atomic::Ordering;

    fn config(base_url: &str, dims: usize) -> EmbeddingConfig {
        EmbeddingConfig {
            provider: "openai".to_string(),
            model: Some("text-embedding-3-small".to_string()),
            dims: Some(dims),
            base_url: base_url.to_string(),
            max_retries: 2,
            retry_backoff_ms: 1,
            timeout_secs: 5,
        }
    }

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_vec_to_blob_layout() {
        let blob = vec_to_blob(&[1.0, -2.5]);
        assert_eq!(blob.len(), 8);
        assert_eq!(&blob[..4], &1.0f32.to_le_bytes());
        assert_eq!(&blob[4..], &(-2.5f32).to_le_bytes());
    }

    #[test]
    fn test_disabled_config_builds_no_provider() {
        assert!(create_provider(&EmbeddingConfig::default()).unwrap().is_none());
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let provider =
            OpenAIProvider::with_api_key(&config("http://127.0.0.1:9/v1/", 3), "k").unwrap();
        assert_eq!(provider.endpoint(), "http://127.0.0.1:9/v1/embeddings");
        assert_eq!(provider.dims(), 3);
        assert_eq!(provider.model_name(), "text-embedding-3-small");
    }

    #[tokio::test]
    async fn test_embed_success_orders_by_index() {
        let (base_url, calls) = stub::spawn(StatusCode::OK, 3).await;
        let provider = OpenAIProvider::with_api_key(&config(&base_url, 3), stub::API_KEY).unwrap();

        let vectors = provider.embed(&texts(&["first", "second"])).await.unwrap();
        assert_eq!(vectors, vec![vec![0.5; 3], vec![1.5; 3]]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_server_errors_are_retried_then_reported() {
        let (base_url, calls) = stub::spawn(StatusCode::INTERNAL_SERVER_ERROR, 3).await;
        let provider = OpenAIProvider::with_api_key(&config(&base_url, 3), stub::API_KEY).unwrap();

        let err = provider.embed(&texts(&["x"])).await.unwrap_err();
        assert!(format!("{:#}", err).contains("after 3 attempts"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_client_errors_fail_immediately() {
        let (base_url, calls) = stub::spawn(StatusCode::BAD_REQUEST, 3).await;
        let provider = OpenAIProvider::with_api_key(&config(&base_url, 3), stub::API_KEY).unwrap();

        let err = provider.embed(&texts(&["x"])).await.unwrap_err();
        assert!(err.to_string().contains("400"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_rejected() {
        let (base_url, _) = stub::spawn(StatusCode::OK, 2).await;
        let provider = OpenAIProvider::with_api_key(&config(&base_url, 3), stub::API_KEY).unwrap();

        let err = provider.embed(&texts(&["x"])).await.unwrap_err();
        assert!(err.to_string().contains("dims"));
    }
}
