//! OCR: rasterizes document pages and recognizes text via Tesseract.
//!
//! Tesseract is invoked through the CLI rather than bound via FFI,
//! matching the teacher's preference for shelling out to well-known
//! binaries (`pdftoppm`, `tesseract`) over linking their native libraries.

mod tesseract;

pub use tesseract::TesseractBackend;

use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("ocr backend not available: {0}")]
    BackendNotAvailable(String),

    #[error("ocr failed: {0}")]
    OcrFailed(String),

    #[error("ocr io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type OcrOutcome<T> = Result<T, OcrError>;

/// Languages passed to Tesseract's `-l`, matching spec.md §4.2.2's
/// multilingual-by-default requirement (English + French).
#[derive(Debug, Clone)]
pub struct OcrConfig {
    pub language: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: "eng+fra".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OcrResult {
    pub text: String,
    /// Mean per-word confidence (0-100), ignoring words Tesseract reports
    /// with confidence < 0 (non-text TSV rows).
    pub confidence: Option<f32>,
    pub processing_time_ms: u64,
}

pub trait OcrBackend: Send + Sync {
    fn is_available(&self) -> bool;
    fn ocr_image(&self, image_path: &Path) -> OcrOutcome<OcrResult>;
    fn ocr_pdf_page(&self, pdf_path: &Path, page: u32) -> OcrOutcome<OcrResult>;
}
