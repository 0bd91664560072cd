//! CSV export of summaries, per-session history and per-trial detail, plus the shared
//! output opener

use crate::analysis::aggregate::{GroupKey, GroupStats, Summary, aggregate, format_value};
use crate::io::configuration::{
    DEFAULT_CSV_EXTENSION, DETAIL_HEADER, REPORT_TIME_FORMAT, SESSIONS_HEADER, SUMMARY_DECIMALS,
    SUMMARY_HEADER,
};
use crate::io::error::{GmiError, Result, WithContext, file_system};
use crate::session::trial::Session;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// How an output file treats existing contents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Truncate the file and write a fresh header
    #[default]
    Overwrite,
    /// Add rows after whatever the file already holds
    Append,
}

impl WriteMode {
    /// Map an `--append` style flag onto a mode
    pub const fn from_append_flag(append: bool) -> Self {
        if append { Self::Append } else { Self::Overwrite }
    }
}

/// An opened output file and whether it still needs a header row
#[derive(Debug)]
pub struct OutputFile {
    /// Handle positioned for writing
    pub file: File,
    /// True when the file was truncated, newly created or empty
    pub needs_header: bool,
}

/// Open `path` for writing in the given mode, creating missing parent directories
///
/// Append mode never reads or validates what is already in the file.
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created or the file cannot be opened
pub fn open_output(path: &Path, mode: WriteMode) -> Result<OutputFile> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(file_system(parent, "create directory"))?;
    }

    let mut options = OpenOptions::new();
    match mode {
        WriteMode::Overwrite => options.write(true).create(true).truncate(true),
        WriteMode::Append => options.append(true).create(true),
    };
    let file = options.open(path).map_err(file_system(path, "open for writing"))?;

    let needs_header = match mode {
        WriteMode::Overwrite => true,
        WriteMode::Append => {
            file.metadata()
                .map_err(file_system(path, "read metadata"))?
                .len()
                == 0
        }
    };

    Ok(OutputFile { file, needs_header })
}

fn csv_writer(output: OutputFile) -> (csv::Writer<File>, bool) {
    let writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(output.file);
    (writer, output.needs_header)
}

/// Write one row per group in fixed group order
///
/// # Errors
///
/// Returns an error if the file cannot be opened or written
pub fn write_summary_csv(path: &Path, summary: &Summary, mode: WriteMode) -> Result<()> {
    let (mut writer, needs_header) = csv_writer(open_output(path, mode)?);

    if needs_header {
        writer.write_record(SUMMARY_HEADER).with_path(path)?;
    }

    for (key, stats) in summary.groups() {
        writer
            .write_record([
                key.to_string(),
                stats.n.to_string(),
                stats.n_correct.to_string(),
                format_value(stats.accuracy, SUMMARY_DECIMALS),
                format_value(stats.mean_latency, SUMMARY_DECIMALS),
                format_value(stats.median_latency, SUMMARY_DECIMALS),
            ])
            .with_path(path)?;
    }

    writer.flush().map_err(file_system(path, "flush"))?;
    Ok(())
}

/// Group counts read back from a summary CSV
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryRow {
    /// Group the row describes
    pub group: GroupKey,
    /// Trial count
    pub n: usize,
    /// Correct trial count
    pub n_correct: usize,
}

/// Read the `(group, n, n_correct)` columns of a summary CSV
///
/// Repeated header rows, as left behind by appending to an empty file twice, are skipped.
///
/// # Errors
///
/// Returns an error if the file cannot be read or a row does not match the summary layout
pub fn read_summary_csv(path: &Path) -> Result<Vec<SummaryRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_path(path)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.with_path(path)?;
        let line = record.position().map_or(0, csv::Position::line);
        let field = |index: usize| record.get(index).unwrap_or_default();

        if field(0) == SUMMARY_HEADER[0] {
            continue;
        }

        let layout_error = |reason: String| GmiError::SummaryFormat {
            path: path.to_path_buf(),
            reason: format!("line {line}: {reason}"),
        };

        let group = field(0)
            .parse::<GroupKey>()
            .map_err(|e| layout_error(e.to_string()))?;
        let n = field(1)
            .parse::<usize>()
            .map_err(|e| layout_error(format!("n: {e}")))?;
        let n_correct = field(2)
            .parse::<usize>()
            .map_err(|e| layout_error(format!("n_correct: {e}")))?;

        rows.push(SummaryRow {
            group,
            n,
            n_correct,
        });
    }

    Ok(rows)
}

/// Path of the `index`-th (1-based) detail file derived from `base`
///
/// `out` and `out.csv` both become `out_1.csv`; the directory is kept.
pub fn detail_path(base: &Path, index: usize) -> PathBuf {
    let stem = base.file_stem().unwrap_or_default().to_string_lossy();
    let extension = base
        .extension()
        .map_or_else(|| DEFAULT_CSV_EXTENSION.into(), |e| e.to_string_lossy());
    let name = format!("{stem}_{index}.{extension}");

    base.parent()
        .map_or_else(|| PathBuf::from(&name), |parent| parent.join(&name))
}

// Start time, pain level and item list of a session, empty without a header
fn header_fields(session: &Session) -> [String; 3] {
    session.header.as_ref().map_or_else(
        || [String::new(), String::new(), String::new()],
        |header| {
            [
                header.started.format(REPORT_TIME_FORMAT).to_string(),
                header
                    .pain_level
                    .map(|p| p.to_string())
                    .unwrap_or_default(),
                header.items_label(),
            ]
        },
    )
}

/// Write the trials of session `number` (1-based across all inputs) to `path`
///
/// Detail files are always overwritten.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or written
pub fn write_detailed_csv(path: &Path, number: usize, session: &Session) -> Result<()> {
    let (mut writer, _) = csv_writer(open_output(path, WriteMode::Overwrite)?);
    writer.write_record(DETAIL_HEADER).with_path(path)?;

    let [started, pain_level, _] = header_fields(session);
    for (sequence, trial) in session.trials.iter().enumerate() {
        writer
            .write_record([
                number.to_string(),
                started.clone(),
                pain_level.clone(),
                (sequence + 1).to_string(),
                trial.category.to_string(),
                trial.direction.to_string(),
                trial.response.to_string(),
                trial.correct().to_string(),
                format!("{:.3}", trial.latency_secs()),
                trial
                    .timestamp
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_default(),
                trial
                    .image_id
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
            ])
            .with_path(path)?;
    }

    writer.flush().map_err(file_system(path, "flush"))?;
    Ok(())
}

/// Write one row per session: when it ran, pain level, items, duration, and per
/// category/direction bucket the trial count, correct count, total time and total
/// time of correct trials
///
/// Rows carry their session's start time, so appending to the same file builds a
/// history of sessions.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or written
pub fn write_sessions_csv<'a, I>(path: &Path, sessions: I, mode: WriteMode) -> Result<()>
where
    I: IntoIterator<Item = &'a Session>,
{
    let (mut writer, needs_header) = csv_writer(open_output(path, mode)?);

    if needs_header {
        writer.write_record(SESSIONS_HEADER).with_path(path)?;
    }

    let buckets: Vec<GroupKey> = GroupKey::ALL
        .into_iter()
        .filter(|key| matches!(key, GroupKey::CategoryDirection(..)))
        .collect();
    let seconds = |value: f64| format!("{:.*}", SUMMARY_DECIMALS, value);

    for session in sessions {
        let summary = aggregate(&session.trials);
        let overall = summary.overall();
        let bucket_stats: Vec<&GroupStats> =
            buckets.iter().map(|key| summary.get(*key)).collect();

        let mut row: Vec<String> = header_fields(session).into();
        row.push(seconds(session.duration().as_secs_f64()));
        row.push(overall.n.to_string());
        row.push(overall.n_correct.to_string());
        row.extend(bucket_stats.iter().map(|s| s.n.to_string()));
        row.extend(bucket_stats.iter().map(|s| s.n_correct.to_string()));
        row.extend(bucket_stats.iter().map(|s| seconds(s.total_latency)));
        row.extend(bucket_stats.iter().map(|s| seconds(s.correct_latency)));

        writer.write_record(&row).with_path(path)?;
    }

    writer.flush().map_err(file_system(path, "flush"))?;
    Ok(())
}
