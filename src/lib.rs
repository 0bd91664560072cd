//! Left/right discrimination training for graded motor imagery
//!
//! A session shows images of left and right hands or feet, records whether each
//! one was judged correctly and how long it took, and appends the results to a
//! log. Logs can later be parsed and summarized per category and side.

#![forbid(unsafe_code)]

/// Log parsing, statistics and reports
pub mod analysis;
/// Input/output operations and error handling
pub mod io;
/// Session assets, image ordering and the trial loop
pub mod session;

pub use io::error::{GmiError, Result};
