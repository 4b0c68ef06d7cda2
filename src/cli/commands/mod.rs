pub mod migrate;
pub mod reap;
pub mod reprocess;
pub mod serve;
