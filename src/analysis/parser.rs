//! Session log parsing into trial records and session headers

use crate::io::configuration::SESSION_TAG;
use crate::io::error::{GmiError, LogParseError, ParseErrorKind, Result, WithContext};
use crate::session::trial::{
    Category, Direction, ImageId, LogEntry, PainLevel, Session, SessionHeader, Trial,
};
use chrono::{DateTime, FixedOffset};
use csv::StringRecord;
use std::fs::File;
use std::path::Path;
use std::time::Duration;

/// What to do when a row cannot be parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParsePolicy {
    /// Skip the row, remember the error, keep reading
    #[default]
    Lenient,
    /// Stop at the first bad row
    Strict,
}

impl ParsePolicy {
    /// Map a `--strict` style flag onto a policy
    pub const fn from_strict_flag(strict: bool) -> Self {
        if strict { Self::Strict } else { Self::Lenient }
    }
}

/// Everything recovered from one log
#[derive(Debug, Clone, Default)]
pub struct ParsedLog {
    /// Sessions in file order
    pub sessions: Vec<Session>,
    /// Rows that were skipped under the lenient policy
    pub skipped: Vec<LogParseError>,
}

impl ParsedLog {
    /// All trials of all sessions, in file order
    pub fn trials(&self) -> impl Iterator<Item = &Trial> {
        self.sessions.iter().flat_map(|s| s.trials.iter())
    }

    /// Number of valid trials
    pub fn trial_count(&self) -> usize {
        self.sessions.iter().map(|s| s.trials.len()).sum()
    }

    fn push(&mut self, entry: LogEntry) {
        match entry {
            LogEntry::Session(header) => self.sessions.push(Session {
                header: Some(header),
                trials: Vec::new(),
            }),
            LogEntry::Trial(trial) => {
                if let Some(session) = self.sessions.last_mut() {
                    session.trials.push(trial);
                } else {
                    self.sessions.push(Session {
                        header: None,
                        trials: vec![trial],
                    });
                }
            }
        }
    }
}

/// Parse one log row
///
/// Fields are expected to be trimmed already. Nothing is coerced: tokens must match
/// exactly, optional trailing fields may be empty.
///
/// # Errors
///
/// Returns a [`LogParseError`] for `line` describing the first problem found
pub fn parse_record(
    record: &StringRecord,
    line: u64,
) -> std::result::Result<LogEntry, LogParseError> {
    let fail = |kind| LogParseError::new(line, kind);
    let fields: Vec<&str> = record.iter().collect();

    let entry = match fields.as_slice() {
        [tag, rest @ ..] if *tag == SESSION_TAG => parse_session(rest).map(LogEntry::Session),
        _ => parse_trial(&fields).map(LogEntry::Trial),
    };
    entry.map_err(fail)
}

fn parse_session(fields: &[&str]) -> std::result::Result<SessionHeader, ParseErrorKind> {
    let (started, pain, items) = match fields {
        [started] => (*started, "", ""),
        [started, pain] => (*started, *pain, ""),
        [started, pain, items] => (*started, *pain, *items),
        _ => {
            return Err(ParseErrorKind::ColumnCount {
                found: fields.len() + 1,
                expected: "2 to 4 session",
            });
        }
    };

    let pain_level = if pain.is_empty() {
        None
    } else {
        let level = pain
            .parse::<u8>()
            .ok()
            .and_then(PainLevel::new)
            .ok_or_else(|| ParseErrorKind::InvalidPainLevel {
                value: pain.to_string(),
            })?;
        Some(level)
    };

    let items = items
        .split_whitespace()
        .map(|token| {
            Category::from_token(token).ok_or_else(|| ParseErrorKind::UnknownToken {
                field: "session item",
                token: token.to_string(),
            })
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(SessionHeader {
        started: parse_timestamp(started)?,
        pain_level,
        items,
    })
}

fn parse_trial(fields: &[&str]) -> std::result::Result<Trial, ParseErrorKind> {
    let (category, direction, response, latency, timestamp, image_id) = match fields {
        [c, d, r, l] => (*c, *d, *r, *l, "", ""),
        [c, d, r, l, t] => (*c, *d, *r, *l, *t, ""),
        [c, d, r, l, t, i] => (*c, *d, *r, *l, *t, *i),
        _ => {
            return Err(ParseErrorKind::ColumnCount {
                found: fields.len(),
                expected: "4 to 6 trial",
            });
        }
    };

    let category = Category::from_token(category).ok_or_else(|| ParseErrorKind::UnknownToken {
        field: "category",
        token: category.to_string(),
    })?;
    let direction = parse_direction("direction", direction)?;
    let response = parse_direction("response", response)?;
    let latency = parse_latency(latency)?;

    let timestamp = if timestamp.is_empty() {
        None
    } else {
        Some(parse_timestamp(timestamp)?)
    };

    let image_id = if image_id.is_empty() {
        None
    } else {
        Some(
            ImageId::parse(image_id).ok_or_else(|| ParseErrorKind::InvalidImageId {
                value: image_id.to_string(),
            })?,
        )
    };

    Ok(Trial {
        category,
        direction,
        response,
        latency,
        timestamp,
        image_id,
    })
}

fn parse_direction(
    field: &'static str,
    token: &str,
) -> std::result::Result<Direction, ParseErrorKind> {
    Direction::from_token(token).ok_or_else(|| ParseErrorKind::UnknownToken {
        field,
        token: token.to_string(),
    })
}

fn parse_latency(value: &str) -> std::result::Result<Duration, ParseErrorKind> {
    value
        .parse::<f64>()
        .ok()
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .ok_or_else(|| ParseErrorKind::InvalidLatency {
            value: value.to_string(),
        })
}

fn parse_timestamp(value: &str) -> std::result::Result<DateTime<FixedOffset>, ParseErrorKind> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .ok_or_else(|| ParseErrorKind::InvalidTimestamp {
            value: value.to_string(),
        })
}

/// Parse a whole log
///
/// Blank lines and `#` comments are ignored. Trials before the first session row
/// are gathered into a session without header.
///
/// # Errors
///
/// Under [`ParsePolicy::Strict`], returns the first row error. Under either policy,
/// returns an error if the underlying reader fails.
pub fn read_log<R: std::io::Read>(reader: R, policy: ParsePolicy) -> Result<ParsedLog> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut parsed = ParsedLog::default();
    let mut record = StringRecord::new();

    loop {
        let line = csv_reader.position().line();
        match csv_reader.read_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {
                // A whitespace-only line; rows with separators are still parsed
                if record.len() == 1 && record.get(0).is_some_and(str::is_empty) {
                    continue;
                }
                let line = record.position().map_or(line, csv::Position::line);
                match parse_record(&record, line) {
                    Ok(entry) => parsed.push(entry),
                    Err(error) => reject(&mut parsed, error, policy)?,
                }
            }
            Err(error) if error.is_io_error() => return Err(error.into()),
            Err(error) => {
                let line = error.position().map_or(line, csv::Position::line);
                let parse_error = LogParseError::new(
                    line,
                    ParseErrorKind::Malformed {
                        reason: error.to_string(),
                    },
                );
                reject(&mut parsed, parse_error, policy)?;
            }
        }
    }

    Ok(parsed)
}

fn reject(
    parsed: &mut ParsedLog,
    error: LogParseError,
    policy: ParsePolicy,
) -> std::result::Result<(), LogParseError> {
    match policy {
        ParsePolicy::Strict => Err(error),
        ParsePolicy::Lenient => {
            tracing::warn!("Skipping {error}");
            parsed.skipped.push(error);
            Ok(())
        }
    }
}

/// Open and parse a log file
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read, if a row is bad under
/// [`ParsePolicy::Strict`], or if the file has rows but none of them is a valid trial
pub fn read_log_file(path: &Path, policy: ParsePolicy) -> Result<ParsedLog> {
    let file = File::open(path).map_err(crate::io::error::file_system(path, "open log"))?;
    let parsed = read_log(file, policy).with_path(path)?;

    if parsed.trial_count() == 0 && !parsed.skipped.is_empty() {
        return Err(GmiError::NoValidRecords {
            path: path.to_path_buf(),
            skipped: parsed.skipped.len(),
        });
    }

    Ok(parsed)
}
