//! Diagnostic output through `tracing`, written to stderr

use tracing::Level;

/// Level selected by `-v` repetitions and `--quiet`
///
/// Warnings are shown by default; `-v` adds progress details, `-vv` per-image details.
pub const fn level_for(verbose: u8, quiet: bool) -> Level {
    if quiet {
        return Level::ERROR;
    }
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    }
}

/// Install the global subscriber
///
/// Calling this more than once keeps the first subscriber.
pub fn init(verbose: u8, quiet: bool) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level_for(verbose, quiet))
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
