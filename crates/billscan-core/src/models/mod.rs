//! Data models for extracted bills, stored records and configuration.

pub mod bill;
pub mod config;
