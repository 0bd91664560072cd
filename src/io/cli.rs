//! Command-line interface for running sessions and analyzing session logs

use crate::analysis::aggregate::{Summary, aggregate};
use crate::analysis::parser::{ParsePolicy, ParsedLog, read_log_file};
use crate::analysis::report::{session_report, summary_table};
use crate::io::configuration::{
    DEFAULT_ASSET_ROOT, DEFAULT_LOG_PATH, DEFAULT_TRIAL_COUNT, TERMINAL_IMAGE_ROWS,
    TERMINAL_IMAGE_WIDTH,
};
use crate::io::error::{GmiError, Result, invalid_parameter};
use crate::io::export::{
    WriteMode, detail_path, write_detailed_csv, write_sessions_csv, write_summary_csv,
};
use crate::io::log::SessionLog;
use crate::io::progress::ProgressManager;
use crate::io::terminal::{LineResponses, TerminalPresenter};
use crate::session::assets::AssetLayout;
use crate::session::provider::{ImageProvider, ProviderConfig};
use crate::session::runner::{PainPrompt, SessionOutcome, SessionRunner};
use crate::session::trial::{Category, PainLevel};
use clap::{ArgGroup, Args, Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fmt::Write as _;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gmi")]
#[command(
    author,
    version,
    about = "Left/right discrimination training for graded motor imagery"
)]
/// Command-line arguments shared by every subcommand
pub struct Cli {
    /// What to do
    #[command(subcommand)]
    pub command: Command,

    /// Show more diagnostics (-v progress, -vv per image)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only report errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Show images and record left/right judgements
    Run(RunArgs),
    /// Summarize one or more session logs
    Analyze(AnalyzeArgs),
}

/// Options for a training session
// Session switches are independent user preferences
#[allow(clippy::struct_excessive_bools)]
#[derive(Args)]
pub struct RunArgs {
    /// Directory holding hands/{left,right} and feet/{left,right}
    #[arg(long, value_name = "DIR", default_value = DEFAULT_ASSET_ROOT)]
    pub assets: PathBuf,

    /// Log file to append results to
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_LOG_PATH)]
    pub out: PathBuf,

    /// Number of images to show
    #[arg(short, long, value_name = "NUM", default_value_t = DEFAULT_TRIAL_COUNT)]
    pub count: usize,

    /// Only use "hands" or "feet" images
    #[arg(long, value_name = "CATEGORY", value_parser = parse_category)]
    pub limit: Option<Category>,

    /// Draw every image independently, allowing repeats
    #[arg(long)]
    pub repeats: bool,

    /// Keep unequal numbers of images per folder
    #[arg(long)]
    pub no_balance: bool,

    /// Random seed for a reproducible image order
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Pain level (0-10) to record without prompting
    #[arg(
        long,
        value_name = "LEVEL",
        value_parser = parse_pain_level,
        conflicts_with = "no_pain_prompt"
    )]
    pub pain: Option<PainLevel>,

    /// Do not ask for or record a pain level
    #[arg(long)]
    pub no_pain_prompt: bool,

    /// Image width in terminal columns
    #[arg(long, value_name = "COLS", default_value_t = TERMINAL_IMAGE_WIDTH)]
    pub width: u32,
}

impl RunArgs {
    /// Pain level source implied by `--pain` and `--no-pain-prompt`
    pub const fn pain_prompt(&self) -> PainPrompt {
        match (self.pain, self.no_pain_prompt) {
            (Some(level), _) => PainPrompt::Fixed(level),
            (None, true) => PainPrompt::Skip,
            (None, false) => PainPrompt::Ask,
        }
    }

    /// Working-set options
    pub const fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            count: self.count,
            repeats: self.repeats,
            balance: !self.no_balance,
        }
    }
}

/// Options for log analysis
#[derive(Args)]
#[command(group(
    ArgGroup::new("csv_outputs")
        .args(["csv", "sessions_csv"])
        .multiple(true)
))]
pub struct AnalyzeArgs {
    /// Session logs to analyze
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    /// Write the summary of all logs to FILE
    #[arg(long, value_name = "FILE")]
    pub csv: Option<PathBuf>,

    /// Write one row per session, with per-folder counts and times, to FILE
    #[arg(long, value_name = "FILE")]
    pub sessions_csv: Option<PathBuf>,

    /// Append to the summary and session CSVs instead of overwriting them
    #[arg(short, long, requires = "csv_outputs")]
    pub append: bool,

    /// Write each session's trials to FILE_1.csv, FILE_2.csv, ...
    #[arg(long, value_name = "FILE")]
    pub detailed_csv: Option<PathBuf>,

    /// Stop at the first malformed line
    #[arg(long)]
    pub strict: bool,
}

fn parse_category(value: &str) -> std::result::Result<Category, String> {
    Category::from_token(value).ok_or_else(|| format!("expected 'hands' or 'feet', got '{value}'"))
}

fn parse_pain_level(value: &str) -> std::result::Result<PainLevel, String> {
    value
        .parse::<u8>()
        .ok()
        .and_then(PainLevel::new)
        .ok_or_else(|| format!("expected an integer from 0 to 10, got '{value}'"))
}

impl Cli {
    /// Run the selected subcommand
    ///
    /// # Errors
    ///
    /// Returns whatever error the subcommand fails with
    // Allow print for the analysis report, which is the command's output
    #[allow(clippy::print_stdout)]
    pub fn execute(self) -> Result<()> {
        match self.command {
            Command::Run(args) => {
                let outcome = run_session(&args)?;
                if !self.quiet {
                    println!("{}", summary_table(&aggregate(&outcome.trials)));
                }
                Ok(())
            }
            Command::Analyze(args) => {
                let mut analyzer = LogAnalyzer::new(args, !self.quiet);
                let outcome = analyzer.process()?;
                if !self.quiet {
                    print!("{}", outcome.report);
                }
                Ok(())
            }
        }
    }
}

/// Scan assets, run an interactive terminal session and append it to the log
///
/// # Errors
///
/// Returns an error if the assets cannot be scanned, no image is usable, or the
/// session cannot be logged
pub fn run_session(args: &RunArgs) -> Result<SessionOutcome> {
    if args.count == 0 {
        return Err(invalid_parameter("count", &args.count, &"must be at least 1"));
    }

    let layout = AssetLayout::new(&args.assets).limited_to(args.limit);
    layout.ensure_directories()?;
    let scan = layout.scan()?;
    if scan.assets.is_empty() {
        return Err(GmiError::NoImages {
            root: args.assets.clone(),
        });
    }

    let rng = args
        .seed
        .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
    let mut provider = ImageProvider::new(scan.assets, args.provider_config(), rng)?;
    let mut log = SessionLog::open(&args.out)?;

    let stdout = std::io::stdout();
    let stdin = std::io::stdin();
    let mut runner = SessionRunner::new(
        TerminalPresenter::new(stdout.lock(), args.width, TERMINAL_IMAGE_ROWS),
        LineResponses::new(stdin.lock()),
        args.pain_prompt(),
    );

    let outcome = runner.run(&mut provider, &mut log, layout.categories())?;
    if !outcome.completed {
        tracing::warn!(
            "Session recorded {} of {} images",
            outcome.trials.len(),
            provider.total()
        );
    }
    tracing::info!("Results appended to {}", log.path().display());

    Ok(outcome)
}

/// What an analysis produced
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    /// Statistics over every valid trial of every input
    pub summary: Summary,
    /// Per-session reports followed by the summary table
    pub report: String,
    /// Total number of skipped lines across inputs
    pub skipped: usize,
}

/// Orchestrates analysis of several logs with progress tracking
pub struct LogAnalyzer {
    args: AnalyzeArgs,
    progress_manager: Option<ProgressManager>,
}

impl LogAnalyzer {
    /// Create an analyzer; progress is only shown when `show_progress` is set
    pub fn new(args: AnalyzeArgs, show_progress: bool) -> Self {
        let progress_manager = show_progress.then(ProgressManager::new);
        Self {
            args,
            progress_manager,
        }
    }

    /// Parse every input, write requested CSV files and build the report
    ///
    /// # Errors
    ///
    /// Returns an error if an input is missing or entirely unparseable, if a line is
    /// malformed in strict mode, or if an output cannot be written
    pub fn process(&mut self) -> Result<AnalysisOutcome> {
        let policy = ParsePolicy::from_strict_flag(self.args.strict);

        if let Some(ref mut pm) = self.progress_manager {
            pm.initialize(self.args.files.len());
        }

        let mut logs: Vec<ParsedLog> = Vec::with_capacity(self.args.files.len());
        let mut session_number = 0;
        for path in &self.args.files {
            if let Some(ref pm) = self.progress_manager {
                pm.start_file(path);
            }

            let parsed = read_log_file(path, policy)?;
            tracing::info!(
                "{}: {} trials in {} sessions",
                path.display(),
                parsed.trial_count(),
                parsed.sessions.len()
            );

            if let Some(ref base) = self.args.detailed_csv {
                for session in &parsed.sessions {
                    session_number += 1;
                    let target = detail_path(base, session_number);
                    write_detailed_csv(&target, session_number, session)?;
                    tracing::info!("Wrote {}", target.display());
                }
            }

            if let Some(ref pm) = self.progress_manager {
                pm.complete_file();
            }
            logs.push(parsed);
        }

        if let Some(ref pm) = self.progress_manager {
            pm.finish();
        }

        let summary = aggregate(logs.iter().flat_map(ParsedLog::trials));

        let mode = WriteMode::from_append_flag(self.args.append);
        if let Some(ref path) = self.args.csv {
            write_summary_csv(path, &summary, mode)?;
        }
        if let Some(ref path) = self.args.sessions_csv {
            write_sessions_csv(path, logs.iter().flat_map(|log| &log.sessions), mode)?;
        }

        let skipped: usize = logs.iter().map(|log| log.skipped.len()).sum();
        if skipped > 0 {
            tracing::warn!("{skipped} lines skipped");
        }

        let mut report = String::new();
        for (path, log) in self.args.files.iter().zip(&logs) {
            if self.args.files.len() > 1 {
                let _ = writeln!(report, "== {}", path.display());
            }
            for session in &log.sessions {
                report.push_str(&session_report(session));
                report.push('\n');
            }
        }
        report.push_str(&summary_table(&summary));

        Ok(AnalysisOutcome {
            summary,
            report,
            skipped,
        })
    }
}
