//! Line item extraction.
//!
//! A purely syntactic line classifier: every non-empty line that is not a
//! header or summary line and looks like a product description becomes one
//! item, verbatim.

use super::patterns::{ITEM_CANDIDATE, SUMMARY_KEYWORDS};
use super::FieldExtractor;
use crate::models::bill::Item;

/// Line item extractor.
pub struct ItemExtractor;

impl ItemExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ItemExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for ItemExtractor {
    type Output = Item;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        candidate_lines(text).next().map(Item::new)
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        candidate_lines(text).map(Item::new).collect()
    }
}

fn candidate_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !is_summary_line(line))
        .filter(|line| looks_like_item(line))
}

/// Extract line items in source order.
pub fn extract_items(text: &str) -> Vec<Item> {
    ItemExtractor::new().extract_all(text)
}

/// Whether a line is a header or summary line (`Total`, `Invoice #42`, ...).
///
/// Keywords match anywhere in the line, so `Subtotal` is a summary line too.
pub fn is_summary_line(line: &str) -> bool {
    let lowered = line.to_lowercase();
    SUMMARY_KEYWORDS.iter().any(|k| lowered.contains(k))
}

/// Whether a line contains a digit or two consecutive alphabetic words.
pub fn looks_like_item(line: &str) -> bool {
    ITEM_CANDIDATE.is_match(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_headers_and_totals_excluded() {
        let text = "Total: $10.00\nRed Widget\nQty 3 Blue Gadget\nInvoice #55";

        assert_eq!(
            extract_items(text),
            vec![Item::new("Red Widget"), Item::new("Qty 3 Blue Gadget")]
        );
    }

    #[test]
    fn test_lines_are_trimmed_and_casing_kept() {
        let text = "   ACME store   \r\n\n\t2x Coffee\t\n";

        assert_eq!(
            extract_items(text),
            vec![Item::new("ACME store"), Item::new("2x Coffee")]
        );
    }

    #[test]
    fn test_single_words_and_punctuation_dropped() {
        let text = "Widget\n-----\n***\nThank you";
        assert_eq!(extract_items(text), vec![Item::new("Thank you")]);
    }

    #[test]
    fn test_keywords_match_inside_words() {
        assert!(is_summary_line("Subtotal 9.00"));
        assert!(is_summary_line("BILLING ADDRESS"));
        assert!(is_summary_line("Summary"));
        assert!(!is_summary_line("Red Widget 2.00"));
    }

    #[test]
    fn test_no_dedup() {
        let text = "Red Widget\nRed Widget";
        assert_eq!(extract_items(text).len(), 2);
    }

    #[test]
    fn test_extract_first() {
        let extractor = ItemExtractor::new();
        assert_eq!(
            extractor.extract("Invoice 1\nRed Widget\nBlue Gadget"),
            Some(Item::new("Red Widget"))
        );
        assert_eq!(extractor.extract("Total 3"), None);
    }
}
