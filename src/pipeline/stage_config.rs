use crate::models::{JobStage, VersionStatus};

/// Version status the orchestrator sets when a stage's job is enqueued
/// and starts running (spec.md §4.3's `enqueue_stage`). Finalize has no
/// distinct "running" sentinel in the original eleven-state machine — it
/// shares the terminal `ready`/`done` state.
pub fn running_sentinel(stage: JobStage) -> VersionStatus {
    match stage {
        JobStage::Extract => VersionStatus::Extracting,
        JobStage::Ocr => VersionStatus::OcrRunning,
        JobStage::Chunk => VersionStatus::Chunking,
        JobStage::Embed => VersionStatus::Embedding,
        JobStage::Finalize => VersionStatus::Done,
    }
}

/// Version status set once a stage's job completes.
pub fn done_sentinel(stage: JobStage) -> VersionStatus {
    match stage {
        JobStage::Extract => VersionStatus::Extracted,
        JobStage::Ocr => VersionStatus::OcrDone,
        JobStage::Chunk => VersionStatus::Chunked,
        JobStage::Embed => VersionStatus::Embedded,
        JobStage::Finalize => VersionStatus::Done,
    }
}
