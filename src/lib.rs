//! Local knowledge appliance: document ingestion pipeline and hybrid search.
//!
//! The crate is split into the storage/model layer (`models`, `schema`,
//! `repository`), the external collaborator adapters (`external`, `queue`,
//! `progress`), the ingestion pipeline (`pipeline`), the search engine
//! (`search`), the plain-function tool surface (`tools`), and the HTTP
//! surface (`server`). `cli` and `config` wire these together for the
//! `lka` and `lka-worker` binaries.

pub mod cli;
pub mod config;
pub mod error;
pub mod external;
pub mod models;
pub mod pipeline;
pub mod progress;
pub mod queue;
pub mod repository;
pub mod schema;
pub mod search;
pub mod server;
pub mod tools;

pub mod ocr;

pub use error::{AppError, AppResult};
