//! Terminal output for the binary.
//!
//! Progress goes through the `log` facade and is rendered by a
//! `tracing-subscriber` formatter installed with [`init_logging`]; the
//! end-of-build summary is written directly with [`write_stderr_line`].
//! Stdout is never used.

use crate::report::{ArtefactOutcome, BuildReport};
use std::io::Write;
use tracing_subscriber::EnvFilter;

/// Write one line, ignoring failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort output; nothing sensible to do on failure.
    }
}

/// Map `-v` repetitions and `--quiet` to an [`EnvFilter`] directive.
///
/// Dependencies stay at `warn` unless the run is quiet; only this crate's
/// records follow the verbosity flags.
#[must_use]
pub fn filter_directive(verbosity: u8, quiet: bool) -> String {
    if quiet {
        return "error".to_owned();
    }
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    format!("warn,{}={level}", env!("CARGO_CRATE_NAME"))
}

/// Install the global stderr subscriber.
///
/// `RUST_LOG` is honoured when neither `-v` nor `-q` was given. Records
/// emitted through the `log` macros are bridged into the subscriber.
pub fn init_logging(verbosity: u8, quiet: bool) {
    let directive = filter_directive(verbosity, quiet);
    let filter = if verbosity == 0 && !quiet {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&directive))
    } else {
        EnvFilter::new(&directive)
    };
    let installed = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .try_init();
    if installed.is_err() {
        // A subscriber is already installed; keep it.
    }
}

/// Write the failure list and the summary line for `report`.
pub fn write_report(stderr: &mut dyn Write, report: &BuildReport) {
    for record in report.failures() {
        if let ArtefactOutcome::Failed { reason } = &record.outcome {
            write_stderr_line(stderr, format!("failed: {}: {reason}", record.source));
        }
    }
    write_stderr_line(stderr, report.summary_line());
}
