//! Boundary-preferring text splitting shared by extract's re-pagination
//! (no overlap) and chunk's overlapping windows (spec.md §4.2.1, §4.2.3):
//! prefer a paragraph break past the window's midpoint, then a sentence
//! terminator followed by whitespace, then a space, else a hard cut.
//!
//! Offsets are byte offsets into the `&str`, snapped to UTF-8 char
//! boundaries — a reasonable proxy for "characters" given the target
//! window sizes are tunable constants, not an exact contract.

fn floor_char_boundary(text: &str, mut idx: usize) -> usize {
    if idx >= text.len() {
        return text.len();
    }
    while idx > 0 && !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn find_split(text: &str, window_start: usize, window_end: usize) -> usize {
    let window_end = window_end.min(text.len());
    if window_start >= window_end {
        return window_end;
    }
    let mid = floor_char_boundary(text, window_start + (window_end - window_start) / 2);

    if let Some(pos) = text[mid..window_end].find("\n\n") {
        return mid + pos + 2;
    }

    let bytes = text.as_bytes();
    let mut i = mid;
    while i + 1 < window_end {
        let c = bytes[i];
        if (c == b'.' || c == b'!' || c == b'?') && bytes[i + 1].is_ascii_whitespace() {
            return i + 2;
        }
        i += 1;
    }

    let mut last_space = None;
    for i in mid..window_end {
        if bytes[i] == b' ' {
            last_space = Some(i + 1);
        }
    }
    last_space.unwrap_or(window_end)
}

/// Splits `text` into sequential, non-overlapping pages of roughly
/// `target_chars` each, used when a format has no native pagination.
pub fn repaginate(text: &str, target_chars: usize) -> Vec<String> {
    if text.is_empty() {
        return vec![String::new()];
    }
    let mut pages = Vec::new();
    let mut start = 0usize;
    while start < text.len() {
        let remaining = text.len() - start;
        if remaining <= target_chars {
            pages.push(text[start..].to_string());
            break;
        }
        let window_end = floor_char_boundary(text, start + target_chars);
        let split = floor_char_boundary(text, find_split(text, start, window_end)).max(start + 1);
        pages.push(text[start..split].to_string());
        start = split;
    }
    pages
}

/// Splits `text` into overlapping `(start, end)` byte-offset windows
/// targeting `target_chars` each with `overlap_chars` shared between
/// consecutive windows, used by the chunk stage.
pub fn split_windows(text: &str, target_chars: usize, overlap_chars: usize) -> Vec<(usize, usize)> {
    if text.is_empty() {
        return vec![(0, 0)];
    }
    let mut windows = Vec::new();
    let mut start = 0usize;
    while start < text.len() {
        let remaining = text.len() - start;
        let end = if remaining <= target_chars {
            text.len()
        } else {
            let window_end = floor_char_boundary(text, start + target_chars);
            floor_char_boundary(text, find_split(text, start, window_end)).max(start + 1)
        };
        windows.push((start, end));
        if end >= text.len() {
            break;
        }
        let next_start = floor_char_boundary(text, end.saturating_sub(overlap_chars));
        start = if next_start > start { next_start } else { end };
    }
    windows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repaginate_short_text_is_single_page() {
        let pages = repaginate("hello world", 1000);
        assert_eq!(pages, vec!["hello world".to_string()]);
    }

    #[test]
    fn repaginate_splits_on_paragraph_break_past_midpoint() {
        let text = format!("{}\n\n{}", "a".repeat(60), "b".repeat(60));
        let pages = repaginate(&text, 100);
        assert_eq!(pages.len(), 2);
        assert!(pages[0].ends_with("\n\n"));
    }

    #[test]
    fn split_windows_covers_entire_text_with_overlap() {
        let text = "word ".repeat(500);
        let windows = split_windows(&text, 200, 40);
        assert!(windows.len() > 1);
        assert_eq!(windows.last().unwrap().1, text.len());
        for pair in windows.windows(2) {
            assert!(pair[1].0 < pair[0].1, "windows should overlap");
        }
    }

    #[test]
    fn split_windows_empty_text_yields_one_empty_window() {
        assert_eq!(split_windows("", 1000, 150), vec![(0, 0)]);
    }
}
