//! Input/output: command line, configuration, errors, log files and terminal

/// Command-line parsing and subcommand execution
pub mod cli;
/// Default paths, limits and file layouts
pub mod configuration;
/// Error types shared by every module
pub mod error;
/// Summary and detailed CSV output
pub mod export;
/// Appending sessions and trials to the session log
pub mod log;
/// Diagnostic output setup
pub mod logging;
/// Progress display for batch analysis
pub mod progress;
/// Image rendering and line input for terminals
pub mod terminal;
