//! Line normalization for extracted manifest text.

use tracing::trace;

use super::patterns::{
    COLUMN_HEADER, CURRENCY_NOISE, DATE_HEADER_LINE, PAGE_BREAK_DASHED, PAGE_BREAK_OF,
    PAGE_FRAGMENT_DASHED, PAGE_FRAGMENT_OF,
};
use super::rules::ManifestRules;

/// Split raw manifest text into candidate content lines.
///
/// Drops blank lines, page-break markers, report banners, the date and
/// column headers and stray currency totals, then strips page-break
/// fragments that OCR folded into content lines.
pub fn normalize(text: &str, rules: &ManifestRules) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !is_dropped(line, rules))
        .filter_map(|line| {
            let cleaned = strip_page_fragments(line);
            (!cleaned.is_empty()).then_some(cleaned)
        })
        .collect()
}

fn is_dropped(line: &str, rules: &ManifestRules) -> bool {
    let dropped = PAGE_BREAK_DASHED.is_match(line)
        || PAGE_BREAK_OF.is_match(line)
        || rules.header_boilerplate.is_match(line)
        || DATE_HEADER_LINE.is_match(line)
        || COLUMN_HEADER.is_match(line)
        || CURRENCY_NOISE.is_match(line);

    if dropped {
        trace!("Dropped line: {}", line);
    }
    dropped
}

fn strip_page_fragments(line: &str) -> String {
    let line = PAGE_FRAGMENT_OF.replace_all(line, "");
    let line = PAGE_FRAGMENT_DASHED.replace_all(line.trim(), "");
    line.trim().to_string()
}
