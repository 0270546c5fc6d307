//! Bill field extraction.

mod pipeline;
pub mod rules;

pub use pipeline::{BillParser, BillPipeline, RuleBasedBillParser};
