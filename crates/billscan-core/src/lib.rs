//! Core library for bill OCR processing.
//!
//! This crate provides:
//! - Text acquisition behind the [`TextSource`] trait (pure Rust OCR with the `native` feature)
//! - Heuristic extraction of the total amount, date and line items from raw OCR text
//! - Bill drafts and records with a JSON-file backed store

pub mod error;
pub mod extract;
pub mod models;
pub mod ocr;
pub mod store;

pub use error::{BillscanError, OcrError, Result, StoreError};
pub use extract::{BillParser, BillPipeline, RuleBasedBillParser};
pub use models::bill::{BillDraft, BillRecord, ExtractionResult, Item};
pub use models::config::BillscanConfig;
pub use ocr::{is_supported_image, TextSource, SUPPORTED_EXTENSIONS};
#[cfg(feature = "native")]
pub use ocr::PureOcrEngine;
pub use store::{BillStore, JsonBillStore};
