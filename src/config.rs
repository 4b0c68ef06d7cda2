//! Configuration for the local knowledge appliance.
//!
//! Loaded from environment variables (with `.env` file support via
//! `dotenvy`, loaded once in `main` before this runs), mirroring the
//! teacher's env-first configuration style but without the `prefer`/
//! `prefer_db` layered-config machinery, which this appliance has no use
//! for: there is no per-source config history to reconcile, just a flat
//! set of service endpoints and limits.

use std::env;

use serde::{Deserialize, Serialize};

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Runtime configuration shared by the `serve` and worker processes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Diesel-compatible SQLite database URL, e.g. `./data/lka.db`.
    pub database_url: String,

    /// S3-compatible object store endpoint (e.g. MinIO).
    pub object_store_endpoint: String,
    pub object_store_bucket: String,
    pub object_store_access_key: String,
    pub object_store_secret_key: String,
    pub object_store_region: String,

    /// Embedding service base URL (`POST {embedder_url}/embed`).
    pub embedder_url: String,

    /// Apache Tika extraction fallback base URL (`PUT {tika_url}/tika`).
    pub tika_url: String,

    /// Redis URL used for both job queues and the progress pub/sub channel.
    pub redis_url: String,

    /// Target character count for synthetic pages created for formats with
    /// no native pagination (DOCX, TXT, Tika-extracted text).
    pub synthetic_page_chars: usize,

    /// Maximum accepted upload size, in megabytes.
    pub max_upload_size_mb: u64,

    /// Address the HTTP server binds to, e.g. `127.0.0.1:3030`.
    pub bind_address: String,

    /// Stage timeout multiplier used by the orphan reaper: a job is
    /// considered orphaned once it has been `running` for longer than
    /// `reaper_timeout_multiplier` times the stage's configured timeout.
    pub reaper_timeout_multiplier: u32,
}

impl Settings {
    /// Load settings from the environment, falling back to development
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        Self {
            database_url: env_or("DATABASE_URL", "./data/lka.db"),
            object_store_endpoint: env_or("OBJECT_STORE_ENDPOINT", "http://127.0.0.1:9000"),
            object_store_bucket: env_or("OBJECT_STORE_BUCKET", "lka-documents"),
            object_store_access_key: env_or("OBJECT_STORE_ACCESS_KEY", "minioadmin"),
            object_store_secret_key: env_or("OBJECT_STORE_SECRET_KEY", "minioadmin"),
            object_store_region: env_or("OBJECT_STORE_REGION", "us-east-1"),
            embedder_url: env_or("EMBEDDER_URL", "http://127.0.0.1:8081"),
            tika_url: env_or("TIKA_URL", "http://127.0.0.1:9998"),
            redis_url: env_or("REDIS_URL", "redis://127.0.0.1:6379"),
            synthetic_page_chars: env_parse_or("SYNTHETIC_PAGE_CHARS", 3000),
            max_upload_size_mb: env_parse_or("MAX_UPLOAD_SIZE_MB", 200),
            bind_address: env_or("BIND_ADDRESS", "127.0.0.1:3030"),
            reaper_timeout_multiplier: env_parse_or("REAPER_TIMEOUT_MULTIPLIER", 2),
        }
    }

    pub fn max_upload_size_bytes(&self) -> u64 {
        self.max_upload_size_mb * 1024 * 1024
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        // Clear anything a prior test in the same process might have set.
        for key in [
            "DATABASE_URL",
            "OBJECT_STORE_ENDPOINT",
            "MAX_UPLOAD_SIZE_MB",
        ] {
            env::remove_var(key);
        }
        let settings = Settings::from_env();
        assert_eq!(settings.max_upload_size_mb, 200);
        assert_eq!(settings.max_upload_size_bytes(), 200 * 1024 * 1024);
        assert!(!settings.database_url.is_empty());
    }
}
