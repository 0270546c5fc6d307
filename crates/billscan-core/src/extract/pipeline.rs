//! Bill pipeline: text acquisition followed by rule-based field extraction.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::{OcrError, Result};
use crate::models::bill::ExtractionResult;
use crate::ocr::TextSource;

use super::rules::{AmountExtractor, DateExtractor, FieldExtractor, ItemExtractor};

/// Trait for turning raw bill text into extracted fields.
///
/// Parsing is total: every field has a defined absent/default value, so a
/// parser never fails once it has text.
pub trait BillParser {
    /// Parse bill fields from raw text.
    fn parse(&self, text: &str) -> ExtractionResult;
}

/// Parser running the amount, date and item rules over the same text.
pub struct RuleBasedBillParser {
    amounts: AmountExtractor<'static>,
    dates: DateExtractor<'static>,
    items: ItemExtractor,
}

impl RuleBasedBillParser {
    pub fn new() -> Self {
        Self {
            amounts: AmountExtractor::new(),
            dates: DateExtractor::new(),
            items: ItemExtractor::new(),
        }
    }
}

impl Default for RuleBasedBillParser {
    fn default() -> Self {
        Self::new()
    }
}

impl BillParser for RuleBasedBillParser {
    fn parse(&self, text: &str) -> ExtractionResult {
        let start = Instant::now();

        info!("Parsing bill from {} characters of text", text.len());

        // The three rules are independent of each other.
        let total_amount = self.amounts.extract(text).map(|m| m.value);
        let date = self.dates.extract_or_now(text);
        let items = self.items.extract_all(text);

        if total_amount.is_none() {
            debug!("Could not extract total amount");
        }
        if date.is_default {
            debug!("Could not extract date, using current time");
        }

        debug!(
            "Extracted total {:?}, date {}, {} items in {:?}",
            total_amount,
            date.value,
            items.len(),
            start.elapsed()
        );

        ExtractionResult {
            raw_text: text.to_string(),
            total_amount,
            date: date.value,
            date_is_default: date.is_default,
            items,
        }
    }
}

/// Full pipeline from an encoded image to extracted bill fields.
pub struct BillPipeline<S, P = RuleBasedBillParser> {
    source: S,
    parser: P,
}

impl<S: TextSource> BillPipeline<S> {
    /// Pipeline with the rule-based parser.
    pub fn new(source: S) -> Self {
        Self::with_parser(source, RuleBasedBillParser::new())
    }
}

impl<S: TextSource, P: BillParser> BillPipeline<S, P> {
    pub fn with_parser(source: S, parser: P) -> Self {
        Self { source, parser }
    }

    /// Run OCR on the image and extract bill fields.
    ///
    /// When text acquisition fails the error is returned as-is and no
    /// extraction runs. Text that is empty after trimming Unicode whitespace
    /// (including a lone form feed) counts as [`OcrError::EmptyText`].
    /// Callers should treat both as recoverable (ask for a better photo).
    ///
    /// Text obtained elsewhere goes straight to [`BillParser::parse`].
    pub fn process_image(&self, image: &[u8]) -> Result<ExtractionResult> {
        let text = match self.source.extract_text(image) {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                warn!("Text acquisition returned no text");
                return Err(OcrError::EmptyText.into());
            }
            Err(e) => {
                warn!("Text acquisition failed: {}", e);
                return Err(e.into());
            }
        };

        debug!("Acquired {} characters of text", text.len());

        Ok(self.parser.parse(&text))
    }

    pub fn parser(&self) -> &P {
        &self.parser
    }
}
