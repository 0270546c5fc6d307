//! Ordered pattern tables for bill field extraction.
//!
//! All patterns are matched against lowercased text. Order within each table
//! is significant: the first pattern that yields a parseable value wins.

use lazy_static::lazy_static;
use regex::Regex;

/// Which keyword a monetary pattern keys on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountRole {
    /// `total: $12.34`
    Total,
    /// `amount: 12.34`
    Amount,
    /// `sum 12.34`
    Sum,
    /// `$12.34 total`
    CurrencyThenKeyword,
}

/// A monetary pattern; capture group 1 is the number (ASCII digits only).
#[derive(Debug)]
pub struct MonetaryPattern {
    pub role: AmountRole,
    pub regex: Regex,
}

/// Shape of the date phrase a pattern captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRole {
    /// `date: March 4, 2024`
    LabeledMonthName,
    /// `date: 03/04/2024`
    LabeledNumeric,
    /// `03/04/2024` anywhere
    BareNumeric,
}

/// A date pattern; capture group 1 is the date phrase.
#[derive(Debug)]
pub struct DatePattern {
    pub role: DateRole,
    pub regex: Regex,
}

/// Formats tried against a captured date phrase, in order.
///
/// Month-first numeric formats come before day-first ones, so `03/04/2024`
/// reads as March 4.
pub const DATE_FORMATS: [&str; 6] = [
    "%B %d, %Y",
    "%B %d %Y",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
];

/// Month names accepted by the `%B` formats. chrono also takes `mar` for
/// `%B`; bills only count a full name.
pub const FULL_MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Lines containing any of these (case-insensitive) are headers or totals,
/// never items.
pub const SUMMARY_KEYWORDS: [&str; 6] = ["total", "sum", "amount", "date", "invoice", "bill"];

lazy_static! {
    pub static ref AMOUNT_PATTERNS: Vec<MonetaryPattern> = vec![
        MonetaryPattern {
            role: AmountRole::Total,
            regex: Regex::new(r"total[:\s]*\$?([0-9]+\.?[0-9]*)").unwrap(),
        },
        MonetaryPattern {
            role: AmountRole::Amount,
            regex: Regex::new(r"amount[:\s]*\$?([0-9]+\.?[0-9]*)").unwrap(),
        },
        MonetaryPattern {
            role: AmountRole::Sum,
            regex: Regex::new(r"sum[:\s]*\$?([0-9]+\.?[0-9]*)").unwrap(),
        },
        MonetaryPattern {
            role: AmountRole::CurrencyThenKeyword,
            regex: Regex::new(r"\$([0-9]+\.?[0-9]*)\s*(?:total|amount|sum)").unwrap(),
        },
    ];

    pub static ref DATE_PATTERNS: Vec<DatePattern> = vec![
        DatePattern {
            role: DateRole::LabeledMonthName,
            regex: Regex::new(r"date[:\s]+([A-Za-z]+\s+\d{1,2},?\s+\d{4})").unwrap(),
        },
        DatePattern {
            role: DateRole::LabeledNumeric,
            regex: Regex::new(r"date[:\s]+(\d{1,2}[-/]\d{1,2}[-/]\d{2,4})").unwrap(),
        },
        DatePattern {
            role: DateRole::BareNumeric,
            regex: Regex::new(r"(\d{1,2}[-/]\d{1,2}[-/]\d{2,4})").unwrap(),
        },
    ];

    /// A digit, or two consecutive alphabetic words.
    pub static ref ITEM_CANDIDATE: Regex = Regex::new(
        r"\d+|[A-Za-z]+\s+[A-Za-z]+"
    ).unwrap();
}
