//! Progress display while analyzing several log files

use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::LazyLock;

static BATCH_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("[{elapsed_precise}] Logs: [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
});

/// Tracks how many logs have been analyzed
///
/// Stays hidden for a single log, where the report itself is the feedback.
pub struct ProgressManager {
    bar: ProgressBar,
    file_count: usize,
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressManager {
    /// Create a progress manager with nothing to track yet
    pub fn new() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            file_count: 0,
        }
    }

    /// Prepare the bar for `file_count` logs
    pub fn initialize(&mut self, file_count: usize) {
        self.file_count = file_count;
        if file_count > 1 {
            self.bar = ProgressBar::new(file_count as u64);
            self.bar.set_style(BATCH_STYLE.clone());
        }
    }

    /// Number of logs being tracked
    pub const fn file_count(&self) -> usize {
        self.file_count
    }

    /// Show which log is being read
    pub fn start_file(&self, path: &Path) {
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        self.bar.set_message(name);
    }

    /// Mark one log as done
    pub fn complete_file(&self) {
        self.bar.inc(1);
    }

    /// Remove the bar
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
