//! Chunk stage: concatenates a version's pages into one text, splits it
//! into overlapping ~1000-char windows (150-char overlap), and maps each
//! window back onto the page(s) it spans (spec.md §4.2.3).

use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{Chunk, DocumentPage, Language, Metric};

use super::windowing::split_windows;
use super::StageContext;

const TARGET_CHARS: usize = 1000;
const OVERLAP_CHARS: usize = 150;

struct PageOffset {
    page_num: i32,
    start: usize,
    end: usize,
    ocr_used: bool,
    ocr_confidence: Option<f32>,
}

fn concatenate(pages: &[DocumentPage]) -> (String, Vec<PageOffset>) {
    let mut text = String::new();
    let mut offsets = Vec::with_capacity(pages.len());
    for page in pages {
        let start = text.len();
        text.push_str(&page.text);
        let end = text.len();
        text.push('\n');
        offsets.push(PageOffset {
            page_num: page.page_num,
            start,
            end,
            ocr_used: page.ocr_used,
            ocr_confidence: page.ocr_confidence,
        });
    }
    (text, offsets)
}

fn page_at(offsets: &[PageOffset], pos: usize) -> &PageOffset {
    offsets
        .iter()
        .find(|po| pos >= po.start && pos < po.end)
        .or_else(|| offsets.iter().rev().find(|po| pos >= po.start))
        .unwrap_or(&offsets[0])
}

const FRENCH_MARKERS: &[&str] = &[
    " le ", " la ", " les ", " des ", " une ", " dans ", " pour ", " avec ", " qui ", " que ", " sur ", " être ",
    " été ",
];
const ENGLISH_MARKERS: &[&str] = &[
    " the ", " and ", " is ", " are ", " of ", " to ", " in ", " that ", " with ", " for ", " on ", " as ",
];
const FRENCH_DIACRITICS: &str = "àâæçéèêëîïôœùûüÿ";

fn detect_language(text: &str) -> Language {
    let lower = text.to_lowercase();
    let has_diacritics = lower.chars().any(|c| FRENCH_DIACRITICS.contains(c));
    let french_score = FRENCH_MARKERS.iter().filter(|m| lower.contains(*m)).count();
    let english_score = ENGLISH_MARKERS.iter().filter(|m| lower.contains(*m)).count();

    if french_score > english_score || (has_diacritics && french_score >= english_score) {
        Language::French
    } else {
        Language::English
    }
}

pub async fn run(ctx: &StageContext, version_id: Uuid) -> AppResult<Option<Metric>> {
    let version = ctx.repos.versions.get(version_id).await?;
    let pages = ctx.repos.pages.get_pages(version_id).await?;

    if pages.is_empty() {
        ctx.repos.chunks.replace_chunks(version_id, &[]).await?;
        return Ok(Some(Metric::counts().with("chunks", 0.0).build()));
    }

    let (text, offsets) = concatenate(&pages);
    let windows = split_windows(&text, TARGET_CHARS, OVERLAP_CHARS);

    let chunks: Vec<Chunk> = windows
        .into_iter()
        .enumerate()
        .filter(|(_, (start, end))| end > start)
        .map(|(i, (start, end))| {
            let slice = &text[start..end];
            let first_page = page_at(&offsets, start);
            let last_page = page_at(&offsets, end.saturating_sub(1).max(start));
            let ocr_used = offsets
                .iter()
                .filter(|po| po.start < end && po.end > start)
                .any(|po| po.ocr_used);
            let ocr_confidence = {
                let values: Vec<f32> = offsets
                    .iter()
                    .filter(|po| po.start < end && po.end > start)
                    .filter_map(|po| po.ocr_confidence)
                    .collect();
                if values.is_empty() {
                    None
                } else {
                    Some(values.iter().sum::<f32>() / values.len() as f32)
                }
            };

            Chunk::new(
                version_id,
                version.document_id,
                i as i32,
                slice.to_string(),
                detect_language(slice),
                first_page.page_num,
                last_page.page_num,
                ocr_used,
                ocr_confidence,
            )
        })
        .collect();

    let chunk_count = chunks.len();
    ctx.repos.chunks.replace_chunks(version_id, &chunks).await?;

    Ok(Some(Metric::counts().with("chunks", chunk_count as f64).build()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_french_from_markers_and_diacritics() {
        assert_eq!(detect_language("Le gouvernement a été informé par la commission."), Language::French);
    }

    #[test]
    fn detects_english_by_default() {
        assert_eq!(detect_language("The committee reviewed the report and issued a statement."), Language::English);
    }
}
