//! Bill data models: pipeline output, corrected drafts and stored records.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single line item recovered from a bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Trimmed source line, casing preserved.
    pub description: String,
}

impl Item {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// Output of the extraction pipeline for one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    /// Raw OCR text the fields were extracted from.
    pub raw_text: String,

    /// Total amount, absent when no amount pattern matched.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub total_amount: Option<Decimal>,

    /// Bill date. Midnight of the parsed date, or the extraction time when
    /// nothing parsed (see `date_is_default`).
    pub date: NaiveDateTime,

    /// True when `date` is the "now" fallback rather than a parsed date.
    #[serde(default)]
    pub date_is_default: bool,

    /// Line items in source order.
    pub items: Vec<Item>,
}

impl ExtractionResult {
    /// Item descriptions joined with a comma, as shown in reports.
    pub fn items_summary(&self) -> String {
        join_descriptions(&self.items)
    }
}

/// An extraction result after human review, ready to be stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillDraft {
    pub customer_name: String,
    pub date: Option<NaiveDate>,
    pub total_amount: Decimal,
    pub items: Vec<Item>,
    pub raw_text: String,
}

impl BillDraft {
    /// Pre-fill a draft from pipeline output.
    ///
    /// The customer name is left empty for the user to fill in and a missing
    /// total becomes zero.
    pub fn from_extraction(result: &ExtractionResult) -> Self {
        Self {
            customer_name: String::new(),
            date: Some(result.date.date()),
            total_amount: result.total_amount.unwrap_or(Decimal::ZERO),
            items: result.items.clone(),
            raw_text: result.raw_text.clone(),
        }
    }

    pub fn with_customer_name(mut self, name: impl Into<String>) -> Self {
        self.customer_name = name.into();
        self
    }

    pub fn with_date(mut self, date: Option<NaiveDate>) -> Self {
        self.date = date;
        self
    }

    pub fn with_total_amount(mut self, amount: Decimal) -> Self {
        self.total_amount = amount;
        self
    }

    pub fn with_items(mut self, items: Vec<Item>) -> Self {
        self.items = items;
        self
    }

    /// Turn the draft into a record. A draft without a date takes the UTC
    /// date of `created_at`.
    pub fn into_record(self, id: u64, created_at: DateTime<Utc>) -> BillRecord {
        BillRecord {
            id,
            customer_name: self.customer_name,
            date: self.date.unwrap_or_else(|| created_at.date_naive()),
            total_amount: self.total_amount,
            items: self.items,
            raw_text: self.raw_text,
            created_at,
        }
    }
}

/// A persisted bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillRecord {
    pub id: u64,
    pub customer_name: String,
    pub date: NaiveDate,
    pub total_amount: Decimal,
    pub items: Vec<Item>,
    pub raw_text: String,
    pub created_at: DateTime<Utc>,
}

impl BillRecord {
    /// Item descriptions joined with a comma, as shown in reports.
    pub fn items_summary(&self) -> String {
        join_descriptions(&self.items)
    }
}

fn join_descriptions(items: &[Item]) -> String {
    items
        .iter()
        .map(|i| i.description.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
