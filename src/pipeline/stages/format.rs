//! Format sniffing shared by the extract and OCR stages: which native path
//! (or Tika fallback) a version's bytes should be routed through, per
//! spec.md §4.2.1's per-format table.

use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    Pdf,
    Docx,
    Txt,
    Rtf,
    Image,
    Other,
}

/// Content-sniffs the RTF magic bytes first (a `.doc` extension can lie),
/// then falls back to the declared MIME type and filename extension.
pub fn sniff_format(mime_type: &str, filename: &str, bytes: &[u8]) -> FormatKind {
    if bytes.starts_with(br"{\rtf") {
        return FormatKind::Rtf;
    }

    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    let mime = mime_type.to_ascii_lowercase();

    if mime.contains("pdf") || ext == "pdf" {
        FormatKind::Pdf
    } else if mime.starts_with("image/") || matches!(ext.as_str(), "jpg" | "jpeg" | "png" | "tiff" | "tif" | "bmp") {
        FormatKind::Image
    } else if mime.contains("rtf") || ext == "rtf" {
        FormatKind::Rtf
    } else if mime.contains("word") || mime.contains("officedocument.wordprocessingml") || matches!(ext.as_str(), "docx" | "doc") {
        FormatKind::Docx
    } else if mime == "text/plain" || ext == "txt" {
        FormatKind::Txt
    } else {
        FormatKind::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_rtf_by_content_even_with_doc_extension() {
        let bytes = br"{\rtf1\ansi some content}";
        assert_eq!(sniff_format("application/msword", "memo.doc", bytes), FormatKind::Rtf);
    }

    #[test]
    fn falls_back_to_extension_for_docx() {
        assert_eq!(
            sniff_format("application/octet-stream", "report.docx", b"PK\x03\x04"),
            FormatKind::Docx
        );
    }

    #[test]
    fn unrecognized_extension_routes_to_other() {
        assert_eq!(sniff_format("application/x-foo", "x.foo", b"whatever"), FormatKind::Other);
    }
}
