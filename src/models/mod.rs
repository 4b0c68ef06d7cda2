//! Domain types shared across the repository, pipeline, and search layers.
//!
//! Each type is a plain serde struct here; its Diesel `Queryable`/
//! `Insertable` counterpart lives in `repository::records`, mirroring the
//! teacher's split between `models/document.rs` (domain shape) and
//! `repository/diesel_models.rs` (wire/row shape).

mod chunk;
mod document;
mod enums;
mod job;
mod page;
mod upload;
mod version;

pub use chunk::{cosine_similarity, decode_embedding, encode_embedding, Chunk, EMBEDDING_DIM};
pub use document::Document;
pub use enums::{DocumentStatus, JobStage, JobStatus, Language, UploadStatus, VersionStatus};
pub use job::{IngestionJob, Metric};
pub use page::DocumentPage;
pub use upload::Upload;
pub use version::DocumentVersion;
