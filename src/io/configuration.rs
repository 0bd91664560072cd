//! Session defaults, file layout constants and output formats

// Asset layout
/// Root directory holding `<category>/<direction>` image folders
pub const DEFAULT_ASSET_ROOT: &str = "assets";

// Session runner defaults
/// Log file appended to when no `--out` is given
pub const DEFAULT_LOG_PATH: &str = "log.csv";
/// Number of images shown per session
pub const DEFAULT_TRIAL_COUNT: usize = 30;
/// Highest pain level accepted at the start of a session
pub const MAX_PAIN_LEVEL: u8 = 10;

// Terminal presentation
/// Width of a rendered image in terminal columns
pub const TERMINAL_IMAGE_WIDTH: u32 = 64;
/// Maximum height of a rendered image in terminal rows (two pixels per row)
pub const TERMINAL_IMAGE_ROWS: u32 = 32;

// Log format
/// First field of a row that starts a new session
pub const SESSION_TAG: &str = "session";
/// Number of hex digits kept from an image's SHA-256 digest
pub const IMAGE_ID_LEN: usize = 8;
/// Decimal places kept when writing latencies to the session log
pub const LOG_LATENCY_DECIMALS: usize = 6;

// Report and CSV output
/// Timestamp format used in human-readable reports and detailed CSV
pub const REPORT_TIME_FORMAT: &str = "%d %b %Y %H:%M:%S";
/// Decimal places for accuracy and latency in summaries
pub const SUMMARY_DECIMALS: usize = 3;
/// Marker written wherever a statistic has no trials behind it
pub const NO_DATA: &str = "no data";
/// Extension used for numbered detail files when none is given
pub const DEFAULT_CSV_EXTENSION: &str = "csv";
/// Header of the summary CSV
pub const SUMMARY_HEADER: [&str; 6] = [
    "group",
    "n",
    "n_correct",
    "accuracy",
    "mean_latency",
    "median_latency",
];
/// Header of each detailed CSV
pub const DETAIL_HEADER: [&str; 11] = [
    "session",
    "session_started",
    "pain_level",
    "sequence",
    "category",
    "direction",
    "response",
    "correct",
    "latency",
    "timestamp",
    "image_id",
];
/// Header of the per-session history CSV
pub const SESSIONS_HEADER: [&str; 22] = [
    "started",
    "pain_level",
    "items",
    "duration",
    "n",
    "n_correct",
    "n_hands_left",
    "n_hands_right",
    "n_feet_left",
    "n_feet_right",
    "correct_hands_left",
    "correct_hands_right",
    "correct_feet_left",
    "correct_feet_right",
    "time_hands_left",
    "time_hands_right",
    "time_feet_left",
    "time_feet_right",
    "correct_time_hands_left",
    "correct_time_hands_right",
    "correct_time_feet_left",
    "correct_time_feet_right",
];
