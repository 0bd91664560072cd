//! Log parsing, aggregation and reporting for recorded sessions

/// Per-group statistics over trial records
pub mod aggregate;
/// Session log row parsing
pub mod parser;
/// Text reports for sessions and summaries
pub mod report;
