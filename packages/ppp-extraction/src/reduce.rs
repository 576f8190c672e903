//! Content reduction: bound fetched content to a prompt-safe payload.

use crate::fetch::text::{collapse_whitespace, visible_text};
use crate::types::config::ReducerConfig;
use crate::types::page::FetchResult;

/// Reduce fetched content to a bounded plain-text payload.
///
/// Pure and total: absent content reduces to an empty string, never an
/// error. Prefers the fetcher's extracted text, deriving text from the
/// raw markup only when none was extracted. The result is cut at exactly
/// the configured character budget with no word-boundary alignment.
pub fn reduce(page: &FetchResult, config: &ReducerConfig) -> String {
    let text = if page.has_content() {
        collapse_whitespace(&page.text)
    } else if let Some(html) = &page.html {
        visible_text(html)
    } else {
        String::new()
    };

    truncate_chars(&text, config.max_chars)
}

/// Cut at `max` characters, counting Unicode scalar values so the cut
/// can never split a code point.
fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((index, _)) => text[..index].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(max_chars: usize) -> ReducerConfig {
        ReducerConfig::default().with_max_chars(max_chars)
    }

    #[test]
    fn test_text_at_budget_passes_through_unchanged() {
        let text = "a".repeat(9000);
        let page = FetchResult::text_only("https://example.com", text.clone());
        assert_eq!(reduce(&page, &ReducerConfig::default()), text);
    }

    #[test]
    fn test_budget_plus_one_truncates_to_budget() {
        let text = "a".repeat(9001);
        let page = FetchResult::text_only("https://example.com", text);
        let reduced = reduce(&page, &ReducerConfig::default());
        assert_eq!(reduced.chars().count(), 9000);
    }

    #[test]
    fn test_truncation_counts_chars_not_bytes() {
        let page = FetchResult::text_only("https://example.com", "€€€€€");
        let reduced = reduce(&page, &config(3));
        assert_eq!(reduced, "€€€");
    }

    #[test]
    fn test_whitespace_collapses_before_the_budget_applies() {
        let page = FetchResult::text_only("https://example.com", "  First\n\n  Draw \t Loan  ");
        assert_eq!(reduce(&page, &ReducerConfig::default()), "First Draw Loan");
    }

    #[test]
    fn test_falls_back_to_markup_when_text_missing() {
        let page = FetchResult {
            html: Some("<p>First <b>Draw</b></p><script>x()</script>".to_string()),
            text: String::new(),
            final_url: "https://example.com".to_string(),
        };
        assert_eq!(reduce(&page, &ReducerConfig::default()), "First Draw");
    }

    #[test]
    fn test_no_content_reduces_to_empty_string() {
        let page = FetchResult::text_only("https://example.com", "");
        assert_eq!(reduce(&page, &ReducerConfig::default()), "");
    }
}
