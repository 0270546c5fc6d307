//! Total amount extraction.

use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::debug;

use super::patterns::{MonetaryPattern, AMOUNT_PATTERNS};
use super::{ExtractionMatch, FieldExtractor};

/// Amount field extractor driven by an ordered pattern table.
pub struct AmountExtractor<'a> {
    patterns: &'a [MonetaryPattern],
}

impl AmountExtractor<'static> {
    /// Extractor over the built-in [`AMOUNT_PATTERNS`].
    pub fn new() -> Self {
        Self {
            patterns: &AMOUNT_PATTERNS,
        }
    }
}

impl Default for AmountExtractor<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> AmountExtractor<'a> {
    /// Extractor over a custom pattern table.
    pub fn with_patterns(patterns: &'a [MonetaryPattern]) -> Self {
        Self { patterns }
    }

    fn try_pattern(
        &self,
        rank: usize,
        pattern: &MonetaryPattern,
        lowered: &str,
    ) -> Option<ExtractionMatch<Decimal>> {
        let caps = pattern.regex.captures(lowered)?;
        let raw = caps.get(1)?.as_str();

        match parse_amount(raw) {
            Some(amount) => Some(ExtractionMatch::new(amount, rank, &caps[0])),
            None => {
                debug!("{:?} pattern matched unparseable amount {:?}", pattern.role, raw);
                None
            }
        }
    }
}

impl FieldExtractor for AmountExtractor<'_> {
    type Output = ExtractionMatch<Decimal>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        let lowered = text.to_lowercase();
        self.patterns
            .iter()
            .enumerate()
            .find_map(|(rank, pattern)| self.try_pattern(rank, pattern, &lowered))
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let lowered = text.to_lowercase();
        self.patterns
            .iter()
            .enumerate()
            .filter_map(|(rank, pattern)| self.try_pattern(rank, pattern, &lowered))
            .collect()
    }
}

/// Extract the bill total. `None` means no amount was found, which is distinct
/// from an extracted zero.
pub fn extract_amount(text: &str) -> Option<Decimal> {
    AmountExtractor::new().extract(text).map(|m| m.value)
}

/// Parse a plain decimal amount (`42`, `42.5`, `42.`).
///
/// Only ASCII digits and a single decimal point are accepted; no thousands
/// separators, no sign.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let s = s.trim();
    let s = s.strip_suffix('.').unwrap_or(s);

    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }

    Decimal::from_str(s).ok()
}
