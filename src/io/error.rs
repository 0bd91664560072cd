//! Error types for asset loading, session logging and log analysis

use std::fmt;
use std::path::{Path, PathBuf};

/// Why a single session log row could not be turned into a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Row has a field count no record shape accepts
    ColumnCount {
        /// Number of fields found on the row
        found: usize,
        /// Human-readable description of the accepted counts
        expected: &'static str,
    },

    /// A category, direction or response token is not part of the taxonomy
    UnknownToken {
        /// Column the token was read from
        field: &'static str,
        /// The token as written in the log
        token: String,
    },

    /// Latency is not a finite, non-negative number of seconds
    InvalidLatency {
        /// The latency field as written in the log
        value: String,
    },

    /// Timestamp is not RFC 3339
    InvalidTimestamp {
        /// The timestamp field as written in the log
        value: String,
    },

    /// Pain level is not an integer between 0 and 10
    InvalidPainLevel {
        /// The pain level field as written in the log
        value: String,
    },

    /// Image id is not eight hexadecimal digits
    InvalidImageId {
        /// The image id field as written in the log
        value: String,
    },

    /// Row could not be split into fields at all
    Malformed {
        /// Description from the CSV reader
        reason: String,
    },
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ColumnCount { found, expected } => {
                write!(f, "expected {expected} fields, found {found}")
            }
            Self::UnknownToken { field, token } => write!(f, "unknown {field} '{token}'"),
            Self::InvalidLatency { value } => {
                write!(f, "latency '{value}' is not a non-negative number of seconds")
            }
            Self::InvalidTimestamp { value } => {
                write!(f, "timestamp '{value}' is not an RFC 3339 date-time")
            }
            Self::InvalidPainLevel { value } => {
                write!(f, "pain level '{value}' is not an integer from 0 to 10")
            }
            Self::InvalidImageId { value } => {
                write!(f, "image id '{value}' is not 8 hexadecimal digits")
            }
            Self::Malformed { reason } => write!(f, "malformed row: {reason}"),
        }
    }
}

/// A log row that failed to parse, tagged with its line number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogParseError {
    /// 1-based line number of the row in its file
    pub line: u64,
    /// What was wrong with the row
    pub kind: ParseErrorKind,
}

impl LogParseError {
    /// Create a parse error for the given line
    pub const fn new(line: u64, kind: ParseErrorKind) -> Self {
        Self { line, kind }
    }
}

impl fmt::Display for LogParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.kind)
    }
}

impl std::error::Error for LogParseError {}

/// Main error type for session and analysis operations
#[derive(Debug)]
pub enum GmiError {
    /// A file or directory does not fit the hands/feet, left/right taxonomy
    ///
    /// Produced as a warning by the asset scanner; the offending entry is skipped.
    AssetLayout {
        /// Offending path
        path: PathBuf,
        /// Why the path was rejected
        reason: String,
    },

    /// A session log row could not be parsed
    LogParse {
        /// Log file the row came from
        path: PathBuf,
        /// Row-level error
        source: LogParseError,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// CSV reading or writing failed below the row level
    Csv {
        /// File being read or written
        path: PathBuf,
        /// Underlying CSV error
        source: csv::Error,
    },

    /// An image could not be decoded for display
    ImageDecode {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image decoding error
        source: image::ImageError,
    },

    /// A summary CSV does not have the layout written by this crate
    SummaryFormat {
        /// Summary file being read
        path: PathBuf,
        /// Description of the mismatch
        reason: String,
    },

    /// A non-empty log produced no valid trial at all
    NoValidRecords {
        /// Log file that was analyzed
        path: PathBuf,
        /// Number of rows that were skipped
        skipped: usize,
    },

    /// No usable images were found under the asset root
    NoImages {
        /// Asset root directory that was scanned
        root: PathBuf,
    },

    /// Parameter validation failed
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },
}

impl fmt::Display for GmiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AssetLayout { path, reason } => {
                write!(f, "Skipping asset '{}': {reason}", path.display())
            }
            Self::LogParse { path, source } => {
                write!(f, "Unparseable row in '{}' at {source}", path.display())
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
            Self::Csv { path, source } => {
                write!(f, "CSV error on '{}': {source}", path.display())
            }
            Self::ImageDecode { path, source } => {
                write!(f, "Failed to decode image '{}': {source}", path.display())
            }
            Self::SummaryFormat { path, reason } => {
                write!(f, "Unexpected summary layout in '{}': {reason}", path.display())
            }
            Self::NoValidRecords { path, skipped } => {
                write!(
                    f,
                    "No valid trials in '{}' ({skipped} lines skipped)",
                    path.display()
                )
            }
            Self::NoImages { root } => {
                write!(f, "No images found under '{}'", root.display())
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
        }
    }
}

impl std::error::Error for GmiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::LogParse { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::ImageDecode { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for crate results
pub type Result<T> = std::result::Result<T, GmiError>;

/// Path and operation to attach to errors raised without them
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// File the failing operation worked on
    pub path: Option<PathBuf>,
    /// Operation being performed
    pub operation: Option<&'static str>,
}

/// Fills in file context on errors converted from lower-level failures
pub trait WithContext<T> {
    /// Add error context to a Result
    ///
    /// # Errors
    ///
    /// Propagates the original error with any unknown path or operation filled in
    fn with_context(self, context: ErrorContext) -> Result<T>;

    /// Add just the path context
    ///
    /// # Errors
    ///
    /// Propagates the original error with the path context applied
    fn with_path(self, path: &Path) -> Result<T>;
}

impl<T, E> WithContext<T> for std::result::Result<T, E>
where
    E: Into<GmiError>,
{
    fn with_context(self, context: ErrorContext) -> Result<T> {
        self.map_err(|e| {
            let mut error = e.into();
            match &mut error {
                GmiError::FileSystem {
                    path, operation, ..
                } => {
                    if let Some(p) = &context.path
                        && path.as_os_str() == UNKNOWN_PATH
                    {
                        p.clone_into(path);
                    }
                    if let Some(op) = context.operation
                        && *operation == UNKNOWN_OPERATION
                    {
                        *operation = op;
                    }
                }
                GmiError::Csv { path, .. }
                | GmiError::LogParse { path, .. }
                | GmiError::ImageDecode { path, .. } => {
                    if let Some(p) = &context.path
                        && path.as_os_str() == UNKNOWN_PATH
                    {
                        p.clone_into(path);
                    }
                }
                _ => {}
            }
            error
        })
    }

    fn with_path(self, path: &Path) -> Result<T> {
        self.with_context(ErrorContext {
            path: Some(path.to_path_buf()),
            ..Default::default()
        })
    }
}

const UNKNOWN_PATH: &str = "<unknown>";
const UNKNOWN_OPERATION: &str = "unknown";

impl From<std::io::Error> for GmiError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from(UNKNOWN_PATH),
            operation: UNKNOWN_OPERATION,
            source: err,
        }
    }
}

impl From<csv::Error> for GmiError {
    fn from(err: csv::Error) -> Self {
        Self::Csv {
            path: PathBuf::from(UNKNOWN_PATH),
            source: err,
        }
    }
}

impl From<image::ImageError> for GmiError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageDecode {
            path: PathBuf::from(UNKNOWN_PATH),
            source: err,
        }
    }
}

impl From<LogParseError> for GmiError {
    fn from(err: LogParseError) -> Self {
        Self::LogParse {
            path: PathBuf::from(UNKNOWN_PATH),
            source: err,
        }
    }
}

/// Build a `map_err` adapter that records the path and operation of an I/O failure
pub fn file_system(
    path: &Path,
    operation: &'static str,
) -> impl FnOnce(std::io::Error) -> GmiError {
    let path = path.to_path_buf();
    move |source| GmiError::FileSystem {
        path,
        operation,
        source,
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> GmiError {
    GmiError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create an asset layout warning
pub fn asset_layout(path: &Path, reason: &impl ToString) -> GmiError {
    GmiError::AssetLayout {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}
