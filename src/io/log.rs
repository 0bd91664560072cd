//! Append-only session log writer
//!
//! Row layout, comma separated, no header:
//!
//! ```text
//! session,<started rfc3339>[,<pain level>[,<items>]]
//! <category>,<direction>,<response>,<latency seconds>[,<timestamp rfc3339>[,<image id>]]
//! ```
//!
//! Lines starting with `#` are comments.

use crate::io::configuration::{LOG_LATENCY_DECIMALS, SESSION_TAG};
use crate::io::error::{Result, WithContext, file_system};
use crate::io::export::{WriteMode, open_output};
use crate::session::trial::{SessionHeader, Trial};
use chrono::SecondsFormat;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Fields of a session row
pub fn session_fields(header: &SessionHeader) -> Vec<String> {
    vec![
        SESSION_TAG.to_string(),
        header.started.to_rfc3339_opts(SecondsFormat::Millis, true),
        header
            .pain_level
            .map(|p| p.to_string())
            .unwrap_or_default(),
        header.items_label(),
    ]
}

/// Fields of a trial row; trailing optional fields are omitted when absent
pub fn trial_fields(trial: &Trial) -> Vec<String> {
    let mut fields = vec![
        trial.category.to_string(),
        trial.direction.to_string(),
        trial.response.to_string(),
        format!("{:.*}", LOG_LATENCY_DECIMALS, trial.latency_secs()),
    ];

    match (&trial.timestamp, &trial.image_id) {
        (Some(timestamp), image_id) => {
            fields.push(timestamp.to_rfc3339_opts(SecondsFormat::Millis, true));
            if let Some(id) = image_id {
                fields.push(id.to_string());
            }
        }
        (None, Some(id)) => {
            fields.push(String::new());
            fields.push(id.to_string());
        }
        (None, None) => {}
    }

    fields
}

/// Appends session and trial rows to a log file, flushing after every row
pub struct SessionLog {
    path: PathBuf,
    writer: csv::Writer<File>,
}

impl SessionLog {
    /// Open `path` for appending, creating it and its parent directories if needed
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or opened
    pub fn open(path: &Path) -> Result<Self> {
        let output = open_output(path, WriteMode::Append)?;
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_writer(output.file);

        Ok(Self {
            path: path.to_path_buf(),
            writer,
        })
    }

    /// Path being written
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the row that opens a session
    ///
    /// # Errors
    ///
    /// Returns an error if the row cannot be written
    pub fn start_session(&mut self, header: &SessionHeader) -> Result<()> {
        self.write_row(&session_fields(header))
    }

    /// Write one trial row
    ///
    /// # Errors
    ///
    /// Returns an error if the row cannot be written
    pub fn record(&mut self, trial: &Trial) -> Result<()> {
        self.write_row(&trial_fields(trial))
    }

    fn write_row(&mut self, fields: &[String]) -> Result<()> {
        self.writer.write_record(fields).with_path(&self.path)?;
        self.writer
            .flush()
            .map_err(file_system(&self.path, "flush"))?;
        Ok(())
    }
}
