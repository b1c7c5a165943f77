//! Log output for the headless binary
//!
//! Stdout carries NDJSON events, so logs go to a daily rolling file under the
//! platform data dir (`~/.local/share/homefeed/logs/` on Linux). When that
//! directory cannot be created, logs go to stderr instead so a read-only home
//! never stops a bootstrap.
//!
//! The filter comes from `HOMEFEED_LOG`:
//!
//! ```bash
//! HOMEFEED_LOG=debug homefeed bootstrap
//! HOMEFEED_LOG=homefeed_app=trace homefeed bootstrap
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::{time::ChronoLocal, MakeWriter};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Environment variable controlling the log filter
pub const LOG_ENV_VAR: &str = "HOMEFEED_LOG";

/// Info for the homefeed crates, warn for dependencies
pub const DEFAULT_FILTER: &str = "homefeed=info,homefeed_app=info,homefeed_client=info,warn";

const LOG_FILE_NAME: &str = "homefeed.log";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Where log lines end up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSink {
    /// Daily rolling file; the path is today's file name without the date suffix
    File(PathBuf),
    Stderr,
}

impl fmt::Display for LogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogSink::File(path) => write!(f, "{}", path.display()),
            LogSink::Stderr => write!(f, "stderr"),
        }
    }
}

/// Install the global subscriber and report where logs go.
///
/// Never fails: an unusable log directory falls back to stderr, and a
/// subscriber installed earlier (tests, embedding) is left in place.
pub fn init() -> LogSink {
    let log_dir = log_directory();

    let (installed, sink) = match prepare_log_file(&log_dir) {
        Ok(file) => {
            let appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE_NAME);
            (install(appender, false), LogSink::File(file))
        }
        Err(e) => {
            let installed = install(std::io::stderr, true);
            tracing::warn!(
                "Cannot create log directory {} ({}), logging to stderr",
                log_dir.display(),
                e
            );
            (installed, LogSink::Stderr)
        }
    };

    if installed {
        tracing::info!("Homefeed {} starting, logging to {}", env!("CARGO_PKG_VERSION"), sink);
    }

    sink
}

fn install<W>(writer: W, ansi: bool) -> bool
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    tracing_subscriber::registry()
        .with(env_filter())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(ansi)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string())),
        )
        .try_init()
        .is_ok()
}

/// Create `log_dir` and return the log file path inside it
fn prepare_log_file(log_dir: &Path) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(log_dir)?;
    Ok(log_dir.join(LOG_FILE_NAME))
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

fn log_directory() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("homefeed")
        .join("logs")
}

/// Path of the rolling log file (the appender adds a date suffix)
pub fn current_log_file() -> PathBuf {
    log_directory().join(LOG_FILE_NAME)
}
