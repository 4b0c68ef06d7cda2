//! Repository layer for SQLite-backed persistence.

mod chunks;
mod documents;
mod jobs;
mod pages;
mod pool;
mod records;
mod uploads;
mod versions;

pub use chunks::ChunkRepository;
pub use documents::DocumentRepository;
pub use jobs::JobRepository;
pub use pages::PageRepository;
pub use pool::DieselSqlitePool;
pub use uploads::UploadRepository;
pub use versions::VersionRepository;

/// All repository handles, bundled for `AppState` and the worker binary.
#[derive(Clone)]
pub struct Repositories {
    pub documents: DocumentRepository,
    pub versions: VersionRepository,
    pub pages: PageRepository,
    pub chunks: ChunkRepository,
    pub jobs: JobRepository,
    pub uploads: UploadRepository,
}

impl Repositories {
    pub fn new(pool: DieselSqlitePool) -> Self {
        Self {
            documents: DocumentRepository::new(pool.clone()),
            versions: VersionRepository::new(pool.clone()),
            pages: PageRepository::new(pool.clone()),
            chunks: ChunkRepository::new(pool.clone()),
            jobs: JobRepository::new(pool.clone()),
            uploads: UploadRepository::new(pool),
        }
    }
}
