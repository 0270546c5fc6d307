//! Rule-based field extractors for bills.
//!
//! Every extractor is total: a missing or malformed field yields an absent
//! value, never an error or a panic.

pub mod amounts;
pub mod dates;
pub mod items;
pub mod patterns;

pub use amounts::{extract_amount, parse_amount, AmountExtractor};
pub use dates::{extract_date, parse_date, DateExtractor, ExtractedDate};
pub use items::{extract_items, is_summary_line, looks_like_item, ItemExtractor};
pub use patterns::*;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the highest-priority occurrence of the field.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract every occurrence, in priority order.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A value recovered by a rule, with the rule that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Index of the winning pattern in its table (0 = highest priority).
    pub rank: usize,
    /// Matched text (lowercased).
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, rank: usize, source: impl Into<String>) -> Self {
        Self {
            value,
            rank,
            source: source.into(),
        }
    }
}
