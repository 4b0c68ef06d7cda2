//! Thin adapters over the appliance's out-of-scope collaborators: the
//! object store, the embedding service, and Apache Tika.

mod embedder;
mod object_store;
mod tika;

pub use embedder::EmbedderClient;
pub use object_store::{ObjectStore, S3ObjectStore};
pub use tika::TikaClient;
