//! Thin client for the embedding service, grounded in the teacher's
//! `scrapers/http_client` convention of a typed struct wrapping a shared
//! `reqwest::Client` rather than passing bare URLs around.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

#[derive(Serialize)]
struct EmbedRequest<'a> {
    texts: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Clone)]
pub struct EmbedderClient {
    client: reqwest::Client,
    base_url: String,
}

impl EmbedderClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("building embedder http client");
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Embed a batch of texts, returning one 384-dim vector per input in
    /// the same order. The embed stage calls this in batches of 256
    /// (spec.md §4.2.4's `BATCH_SIZE`).
    pub async fn embed(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        let response = self
            .client
            .post(format!("{}/embed", self.base_url))
            .json(&EmbedRequest { texts })
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("embedder request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "embedder returned {}",
                response.status()
            )));
        }

        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("embedder response decode failed: {e}")))?;

        if parsed.embeddings.len() != texts.len() {
            return Err(AppError::Upstream(format!(
                "embedder returned {} vectors for {} inputs",
                parsed.embeddings.len(),
                texts.len()
            )));
        }

        Ok(parsed.embeddings)
    }

    pub async fn health(&self) -> bool {
        self.client
            .get(format!("{}/health", self.base_url))
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }
}
