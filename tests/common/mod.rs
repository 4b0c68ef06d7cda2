//! Shared test harness: a fresh migrated sqlite file per test plus an
//! in-memory object store, wired through `AppState::new_in_memory` the same
//! way the teacher's `server/mod.rs` test module builds a router against a
//! tempdir-backed sqlite database.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use tempfile::TempDir;

use lka::config::Settings;
use lka::error::{AppError, AppResult};
use lka::external::ObjectStore;
use lka::repository::DieselSqlitePool;
use lka::server::AppState;

/// In-memory stand-in for the S3-backed object store: a `Mutex<HashMap>`
/// keyed by object key, good enough for exercising the upload/confirm flow
/// without a MinIO instance.
#[derive(Default)]
pub struct FakeObjectStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

#[async_trait]
impl ObjectStore for FakeObjectStore {
    async fn get_object(&self, key: &str) -> AppResult<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("object {key}")))
    }

    async fn put_object(&self, key: &str, bytes: Vec<u8>, _content_type: &str) -> AppResult<()> {
        self.objects.lock().unwrap().insert(key.to_string(), bytes);
        Ok(())
    }

    async fn copy_object(&self, from: &str, to: &str) -> AppResult<()> {
        let bytes = self.get_object(from).await?;
        self.objects.lock().unwrap().insert(to.to_string(), bytes);
        self.objects.lock().unwrap().remove(from);
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> AppResult<()> {
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    _tmp: TempDir,
}

/// Builds a router against a freshly migrated sqlite database and an
/// in-memory object store. `embedder_url` points at an unused local port
/// by default so `hybrid_search`'s lexical-only fallback (spec.md's error
/// taxonomy (v)) is what tests exercise unless a fake embedder is spawned
/// and the caller overrides the port.
pub async fn setup() -> TestApp {
    setup_with_embedder_url("http://127.0.0.1:1").await
}

pub async fn setup_with_embedder_url(embedder_url: &str) -> TestApp {
    let tmp = TempDir::new().expect("tempdir");
    let db_path = tmp.path().join("test.db");
    let db_url = db_path.to_string_lossy().to_string();

    let pool = DieselSqlitePool::new(db_url.clone());
    pool.run_migrations().expect("run migrations");

    let settings = Settings {
        database_url: db_url,
        object_store_endpoint: "http://127.0.0.1:0".to_string(),
        object_store_bucket: "test-bucket".to_string(),
        object_store_access_key: "test".to_string(),
        object_store_secret_key: "test".to_string(),
        object_store_region: "us-east-1".to_string(),
        embedder_url: embedder_url.to_string(),
        tika_url: "http://127.0.0.1:0".to_string(),
        redis_url: "redis://127.0.0.1:0".to_string(),
        synthetic_page_chars: 3000,
        max_upload_size_mb: 200,
        bind_address: "127.0.0.1:0".to_string(),
        reaper_timeout_multiplier: 2,
    };

    let object_store: Arc<dyn ObjectStore> = Arc::new(FakeObjectStore::default());
    let state = AppState::new_in_memory(settings, object_store);
    let router = lka::server::create_router(state.clone());

    TestApp { router, state, _tmp: tmp }
}
