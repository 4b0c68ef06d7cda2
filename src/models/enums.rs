//! Enumerations stored as `Text` columns, converted via `as_str`/`from_str`
//! rather than Diesel's `DbEnum` derive — the teacher never uses `DbEnum`,
//! preferring plain string round-tripping (see the original
//! `DocumentStatus::as_str`/`from_str` pair).

use std::fmt;

/// Pipeline state of a single `DocumentVersion`, advanced one step at a
/// time by the orchestrator as each stage reports completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionStatus {
    Uploaded,
    Extracting,
    Extracted,
    OcrPending,
    OcrRunning,
    OcrDone,
    Chunking,
    Chunked,
    Embedding,
    Embedded,
    Done,
    Error,
}

impl VersionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionStatus::Uploaded => "uploaded",
            VersionStatus::Extracting => "extracting",
            VersionStatus::Extracted => "extracted",
            VersionStatus::OcrPending => "ocr_pending",
            VersionStatus::OcrRunning => "ocr_running",
            VersionStatus::OcrDone => "ocr_done",
            VersionStatus::Chunking => "chunking",
            VersionStatus::Chunked => "chunked",
            VersionStatus::Embedding => "embedding",
            VersionStatus::Embedded => "embedded",
            VersionStatus::Done => "done",
            VersionStatus::Error => "error",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "uploaded" => VersionStatus::Uploaded,
            "extracting" => VersionStatus::Extracting,
            "extracted" => VersionStatus::Extracted,
            "ocr_pending" => VersionStatus::OcrPending,
            "ocr_running" => VersionStatus::OcrRunning,
            "ocr_done" => VersionStatus::OcrDone,
            "chunking" => VersionStatus::Chunking,
            "chunked" => VersionStatus::Chunked,
            "embedding" => VersionStatus::Embedding,
            "embedded" => VersionStatus::Embedded,
            "done" => VersionStatus::Done,
            "error" => VersionStatus::Error,
            _ => return None,
        })
    }
}

impl fmt::Display for VersionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pipeline stage, queued and tracked independently per version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStage {
    Extract,
    Ocr,
    Chunk,
    Embed,
    Finalize,
}

impl JobStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStage::Extract => "extract",
            JobStage::Ocr => "ocr",
            JobStage::Chunk => "chunk",
            JobStage::Embed => "embed",
            JobStage::Finalize => "finalize",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "extract" => JobStage::Extract,
            "ocr" => JobStage::Ocr,
            "chunk" => JobStage::Chunk,
            "embed" => JobStage::Embed,
            "finalize" => JobStage::Finalize,
            _ => return None,
        })
    }

    /// Stage order used by the orchestrator to compute the next stage.
    pub const ORDER: [JobStage; 5] = [
        JobStage::Extract,
        JobStage::Ocr,
        JobStage::Chunk,
        JobStage::Embed,
        JobStage::Finalize,
    ];

    /// Named job queue this stage's jobs are pulled from. OCR and embed
    /// are CPU-bound model invocations on the `cpu` queue; extract, chunk
    /// and finalize are I/O-bound object-store/DB work on the `io` queue
    /// (spec.md §4.3's stage→queue/timeout table), so a long OCR or embed
    /// run can't starve the I/O-bound stages of other versions.
    pub fn queue_name(&self) -> &'static str {
        match self {
            JobStage::Extract | JobStage::Chunk | JobStage::Finalize => "io",
            JobStage::Ocr | JobStage::Embed => "cpu",
        }
    }

    /// Stage timeout, used by the orphan reaper (a job `running` longer
    /// than this times `Settings::reaper_timeout_multiplier` is reclaimed).
    pub fn timeout_secs(&self) -> u64 {
        match self {
            JobStage::Extract => 600,
            JobStage::Ocr => 7200,
            JobStage::Chunk => 1200,
            JobStage::Embed => 1800,
            JobStage::Finalize => 600,
        }
    }

    pub fn next(&self) -> Option<JobStage> {
        let idx = Self::ORDER.iter().position(|s| s == self)?;
        Self::ORDER.get(idx + 1).copied()
    }
}

impl fmt::Display for JobStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Done,
    Error,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Done => "done",
            JobStatus::Error => "error",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "queued" => JobStatus::Queued,
            "running" => JobStatus::Running,
            "done" => JobStatus::Done,
            "error" => JobStatus::Error,
            _ => return None,
        })
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Active,
    Archived,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Active => "active",
            DocumentStatus::Archived => "archived",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "active" => DocumentStatus::Active,
            "archived" => DocumentStatus::Archived,
            _ => return None,
        })
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a staged upload, from its arrival in the staging area of
/// the object store through confirmation (new document or new version),
/// rejection as a duplicate, or completion once its pipeline finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    PendingConfirmation,
    Processing,
    Duplicate,
    Done,
    Error,
}

impl UploadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadStatus::PendingConfirmation => "pending_confirmation",
            UploadStatus::Processing => "processing",
            UploadStatus::Duplicate => "duplicate",
            UploadStatus::Done => "done",
            UploadStatus::Error => "error",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "pending_confirmation" => UploadStatus::PendingConfirmation,
            "processing" => UploadStatus::Processing,
            "duplicate" => UploadStatus::Duplicate,
            "done" => UploadStatus::Done,
            "error" => UploadStatus::Error,
            _ => return None,
        })
    }
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Analyzer language a chunk's text was scored against. Only the languages
/// that have a corresponding FTS5 virtual table are representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Language {
    #[serde(rename = "en")]
    English,
    #[serde(rename = "fr")]
    French,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::French => "fr",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "en" => Language::English,
            "fr" => Language::French,
            _ => return None,
        })
    }

    pub fn all() -> [Language; 2] {
        [Language::English, Language::French]
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
