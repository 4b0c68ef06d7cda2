//! Tesseract OCR backend.
//!
//! Recognition runs in TSV mode (`tesseract ... tsv`) rather than plain
//! `stdout` text mode so a per-word confidence column is available to
//! average into the page-level `ocr_confidence` spec.md §4.2.2 requires.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

use tempfile::TempDir;

use super::{OcrBackend, OcrConfig, OcrError, OcrOutcome, OcrResult};

pub struct TesseractBackend {
    config: OcrConfig,
}

impl TesseractBackend {
    pub fn new() -> Self {
        Self {
            config: OcrConfig::default(),
        }
    }

    pub fn with_config(config: OcrConfig) -> Self {
        Self { config }
    }

    fn run_tesseract_tsv(&self, image_path: &Path) -> OcrOutcome<String> {
        let output = Command::new("tesseract")
            .arg(image_path)
            .arg("stdout")
            .args(["-l", &self.config.language])
            .arg("tsv")
            .output();

        match output {
            Ok(output) if output.status.success() => {
                Ok(String::from_utf8_lossy(&output.stdout).to_string())
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(OcrError::OcrFailed(format!("tesseract failed: {stderr}")))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(
                OcrError::BackendNotAvailable("tesseract not found (install tesseract-ocr)".to_string()),
            ),
            Err(e) => Err(OcrError::Io(e)),
        }
    }

    fn pdf_page_to_image(&self, pdf_path: &Path, page: u32, output_dir: &Path) -> OcrOutcome<PathBuf> {
        let page_str = page.to_string();
        let output_prefix = output_dir.join("page");

        let status = Command::new("pdftoppm")
            .args(["-png", "-r", "300", "-f", &page_str, "-l", &page_str])
            .arg(pdf_path)
            .arg(&output_prefix)
            .status();

        match status {
            Ok(s) if s.success() => self
                .find_page_image(output_dir, page)
                .ok_or_else(|| OcrError::OcrFailed(format!("no image generated for page {page}"))),
            Ok(_) => Err(OcrError::OcrFailed("pdftoppm failed to convert PDF page".to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(OcrError::BackendNotAvailable(
                "pdftoppm not found (install poppler-utils)".to_string(),
            )),
            Err(e) => Err(OcrError::Io(e)),
        }
    }

    fn find_page_image(&self, temp_path: &Path, page_num: u32) -> Option<PathBuf> {
        for digits in [2, 3, 4] {
            let filename = format!("page-{page_num:0digits$}.png");
            let path = temp_path.join(&filename);
            if path.exists() {
                return Some(path);
            }
        }
        None
    }
}

impl Default for TesseractBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses `tesseract ... tsv` output into recognized text (words joined by
/// spaces, lines by `\n`) and the mean confidence of words whose `conf`
/// column is `>= 0` (negative confidences mark non-text TSV rows).
fn parse_tsv(tsv: &str) -> (String, Option<f32>) {
    let mut lines_text: Vec<Vec<&str>> = Vec::new();
    let mut current_line_key: Option<(&str, &str, &str, &str)> = None;
    let mut confidences = Vec::new();

    for row in tsv.lines().skip(1) {
        let cols: Vec<&str> = row.split('\t').collect();
        if cols.len() < 12 {
            continue;
        }
        let level = cols[0];
        if level != "5" {
            continue;
        }
        let (page_num, block_num, par_num, line_num) = (cols[1], cols[2], cols[3], cols[4]);
        let conf: f32 = cols[10].parse().unwrap_or(-1.0);
        let text = cols[11];
        if text.trim().is_empty() {
            continue;
        }
        if conf >= 0.0 {
            confidences.push(conf);
        }

        let key = (page_num, block_num, par_num, line_num);
        if current_line_key != Some(key) {
            lines_text.push(Vec::new());
            current_line_key = Some(key);
        }
        lines_text.last_mut().unwrap().push(text);
    }

    let text = lines_text
        .into_iter()
        .map(|words| words.join(" "))
        .collect::<Vec<_>>()
        .join("\n");

    let confidence = if confidences.is_empty() {
        None
    } else {
        Some(confidences.iter().sum::<f32>() / confidences.len() as f32)
    };

    (text, confidence)
}

impl OcrBackend for TesseractBackend {
    fn is_available(&self) -> bool {
        Command::new("tesseract")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn ocr_image(&self, image_path: &Path) -> OcrOutcome<OcrResult> {
        let start = Instant::now();
        let tsv = self.run_tesseract_tsv(image_path)?;
        let (text, confidence) = parse_tsv(&tsv);

        Ok(OcrResult {
            text,
            confidence,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn ocr_pdf_page(&self, pdf_path: &Path, page: u32) -> OcrOutcome<OcrResult> {
        let start = Instant::now();
        let temp_dir = TempDir::new()?;
        let image_path = self.pdf_page_to_image(pdf_path, page, temp_dir.path())?;
        let tsv = self.run_tesseract_tsv(&image_path)?;
        let (text, confidence) = parse_tsv(&tsv);

        Ok(OcrResult {
            text,
            confidence,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tsv_averaging_only_nonnegative_confidences() {
        let tsv = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext\n\
1\t1\t0\t0\t0\t0\t0\t0\t0\t0\t-1\t\n\
5\t1\t1\t1\t1\t1\t0\t0\t10\t10\t95.5\tHello\n\
5\t1\t1\t1\t1\t2\t10\t0\t10\t10\t80.0\tworld\n";
        let (text, confidence) = parse_tsv(tsv);
        assert_eq!(text, "Hello world");
        assert!((confidence.unwrap() - 87.75).abs() < 0.01);
    }
}
