//! Thin client for the Apache Tika fallback extractor, used when the
//! extract stage's native PDF/DOCX handling doesn't recognize a format
//! (spec.md §4.2.1's Tika fallback path).

use std::time::Duration;

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct TikaClient {
    client: reqwest::Client,
    base_url: String,
}

impl TikaClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("building tika http client");
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Extract plain text from arbitrary bytes via Tika's `PUT /tika`
    /// endpoint, which auto-detects the format from content if the
    /// `Content-Type` hint is wrong.
    pub async fn extract(&self, bytes: Vec<u8>, mime_type: &str) -> AppResult<String> {
        let response = self
            .client
            .put(format!("{}/tika", self.base_url))
            .header("Content-Type", mime_type)
            .header("Accept", "text/plain")
            .body(bytes)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("tika request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!("tika returned {}", response.status())));
        }

        response
            .text()
            .await
            .map_err(|e| AppError::Upstream(format!("tika response decode failed: {e}")))
    }
}
