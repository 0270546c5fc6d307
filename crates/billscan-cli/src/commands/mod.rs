//! CLI command implementations.

pub mod batch;
pub mod bills;
pub mod chat;
pub mod config;
pub mod models;
pub mod process;
