//! Extract stage: pulls a version's bytes from the object store, produces
//! one `DocumentPage` per source page (native pagination for PDF, synthetic
//! re-pagination otherwise), and records whether OCR is needed
//! (spec.md §4.2.1).
//!
//! DOCX/DOC and RTF route through the Tika fallback client rather than a
//! dedicated parsing crate — Tika's own native office-document support
//! already covers them, and spec.md's dispatch table already leans on Tika
//! for RTF and unrecognized formats, so this avoids a second, narrower
//! dependency for the same job (see DESIGN.md).

use std::io::Cursor;

use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{DocumentPage, Metric};

use super::format::{sniff_format, FormatKind};
use super::windowing::repaginate;
use super::StageContext;

pub async fn run(ctx: &StageContext, version_id: Uuid) -> AppResult<Option<Metric>> {
    let version = ctx.repos.versions.get(version_id).await?;
    let bytes = ctx.object_store.get_object(&version.storage_key).await?;
    let kind = sniff_format(&version.mime_type, &version.original_filename, &bytes);

    let pages_text: Vec<String> = match kind {
        FormatKind::Pdf => extract_pdf_pages(&bytes)?,
        FormatKind::Image => vec![String::new()],
        FormatKind::Txt => repaginate(&String::from_utf8_lossy(&bytes), ctx.settings.synthetic_page_chars),
        FormatKind::Docx | FormatKind::Rtf | FormatKind::Other => {
            let text = ctx.tika.extract(bytes.clone(), &version.mime_type).await?;
            repaginate(&text, ctx.settings.synthetic_page_chars)
        }
    };

    let pages: Vec<DocumentPage> = pages_text
        .into_iter()
        .enumerate()
        .map(|(i, text)| DocumentPage::new(version_id, (i + 1) as i32, text))
        .collect();

    ctx.repos.pages.replace_pages(version_id, &pages).await?;

    let total_chars: usize = pages.iter().map(|p| p.text.chars().count()).sum();
    let alpha_chars: usize = pages
        .iter()
        .map(|p| p.text.chars().filter(|c| c.is_alphabetic()).count())
        .sum();
    let alpha_ratio = if total_chars > 0 {
        alpha_chars as f64 / total_chars as f64
    } else {
        0.0
    };

    // Thin text layers (scanned PDFs with a stray OCR'd title page, say)
    // still need OCR even though `has_text_layer` is technically true.
    let (has_text_layer, needs_ocr) = match kind {
        FormatKind::Image => (false, true),
        FormatKind::Pdf => (total_chars > 0, total_chars < 500 || alpha_ratio < 0.20),
        FormatKind::Docx | FormatKind::Txt | FormatKind::Rtf => (true, false),
        FormatKind::Other => (total_chars > 0, false),
    };

    ctx.repos
        .versions
        .set_extract_result(version_id, has_text_layer, needs_ocr, total_chars as i32)
        .await?;

    Ok(Some(
        Metric::counts()
            .with("pages", pages.len() as f64)
            .with("extracted_chars", total_chars as f64)
            .build(),
    ))
}

fn extract_pdf_pages(bytes: &[u8]) -> AppResult<Vec<String>> {
    use oxidize_pdf::parser::PdfReader;
    use oxidize_pdf::text::TextExtractor;

    let reader =
        PdfReader::new(Cursor::new(bytes.to_vec())).map_err(|e| AppError::Stage(format!("pdf parse failed: {e}")))?;
    let document = reader.into_document();
    let mut extractor = TextExtractor::new();
    let extracted = extractor
        .extract_from_document(&document)
        .map_err(|e| AppError::Stage(format!("pdf text extraction failed: {e}")))?;

    if extracted.is_empty() {
        return Ok(vec![String::new()]);
    }
    Ok(extracted.into_iter().map(|page| page.text).collect())
}
