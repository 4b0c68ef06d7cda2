//! OCR stage: runs only when the extract stage set `needs_ocr`. Images are
//! OCR'd whole into a single page; PDFs are rasterized page-by-page at
//! 300 DPI and recognized individually, appending to any native text a
//! page already had rather than overwriting it (spec.md §4.2.2).

use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::Metric;
use crate::ocr::{OcrBackend, TesseractBackend};

use super::format::{sniff_format, FormatKind};
use super::StageContext;

const OCR_SEPARATOR: &str = "\n\n--- OCR ---\n\n";

pub async fn run(ctx: &StageContext, job_id: Uuid, version_id: Uuid) -> AppResult<Option<Metric>> {
    let version = ctx.repos.versions.get(version_id).await?;
    if !version.needs_ocr {
        // `advance_pipeline` synthesizes a skip job before a stale reprocess
        // could ever queue this stage; treat it as a no-op regardless.
        return Ok(Some(Metric::skipped()));
    }

    let bytes = ctx.object_store.get_object(&version.storage_key).await?;
    let kind = sniff_format(&version.mime_type, &version.original_filename, &bytes);

    let backend = TesseractBackend::new();
    if !backend.is_available() {
        return Err(AppError::Upstream("tesseract is not available on this host".to_string()));
    }

    let mut pages = ctx.repos.pages.get_pages(version_id).await?;
    if pages.is_empty() {
        pages.push(crate::models::DocumentPage::new(version_id, 1, String::new()));
    }
    let total = pages.len() as i32;

    let tmp = tempfile::NamedTempFile::new()?;
    std::fs::write(tmp.path(), &bytes)?;

    for (i, page) in pages.iter_mut().enumerate() {
        let result = if kind == FormatKind::Image {
            backend
                .ocr_image(tmp.path())
                .map_err(|e| AppError::Stage(format!("ocr failed: {e}")))?
        } else {
            backend
                .ocr_pdf_page(tmp.path(), page.page_num as u32)
                .map_err(|e| AppError::Stage(format!("ocr failed on page {}: {e}", page.page_num)))?
        };

        if page.text.trim().is_empty() {
            page.text = result.text;
        } else {
            page.text = format!("{}{}{}", page.text, OCR_SEPARATOR, result.text);
        }
        page.ocr_used = true;
        page.ocr_confidence = result.confidence;

        ctx.orchestrator
            .report_progress(job_id, version_id, crate::models::JobStage::Ocr, (i + 1) as i32, total)
            .await?;
    }

    ctx.repos.pages.replace_pages(version_id, &pages).await?;

    Ok(Some(Metric::counts().with("pages_ocred", total as f64).build()))
}
