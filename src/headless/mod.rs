//! Headless mode - JSON event output for scripts
//!
//! The `bootstrap` command prints every coordinator transition to stdout as
//! NDJSON (newline-delimited JSON), one event per line. Each event has an
//! "event" field indicating its type and a millisecond `timestamp`.
//!
//! # Example Output
//!
//! ```json
//! {"event":"started","attempt":1,"timestamp":1704700001000}
//! {"event":"state_changed","attempt":1,"state":{"status":"loading",...},"timestamp":1704700001001}
//! {"event":"profile_loaded","attempt":1,"library_count":3,"eligible_count":2,"timestamp":1704700001120}
//! {"event":"finished","attempt":1,"status":"ready","timestamp":1704700001250}
//! ```

pub mod runner;

use chrono::Utc;
use serde::Serialize;
use std::io::{self, Write};
use tracing::error;

use homefeed_app::BootstrapEvent;
use homefeed_core::{BootstrapStatus, HomeFeedState};

/// Events emitted in headless mode
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HeadlessEvent {
    /// A bootstrap attempt began
    Started { attempt: u64, timestamp: i64 },

    /// A new home-feed snapshot was published
    StateChanged {
        attempt: u64,
        state: HomeFeedState,
        timestamp: i64,
    },

    /// Library order and exclusions were loaded
    ProfileLoaded {
        attempt: u64,
        library_count: usize,
        eligible_count: usize,
        timestamp: i64,
    },

    /// Library names were loaded
    ViewsLoaded {
        attempt: u64,
        named_count: usize,
        timestamp: i64,
    },

    /// Library names could not be loaded
    ViewsFailed {
        attempt: u64,
        reason: String,
        timestamp: i64,
    },

    /// The attempt reached its terminal status
    Finished {
        attempt: u64,
        status: BootstrapStatus,
        timestamp: i64,
    },

    /// Error occurred outside the bootstrap sequence
    Error {
        message: String,
        fatal: bool,
        timestamp: i64,
    },
}

impl HeadlessEvent {
    /// Emit this event to stdout as JSON
    pub fn emit(&self) {
        let json = match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize headless event: {}", e);
                return;
            }
        };

        // NDJSON: one event per line
        let mut stdout = io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", json) {
            error!("Failed to write headless event to stdout: {}", e);
            return;
        }

        // Consumers read line by line, so flush each event
        if let Err(e) = stdout.flush() {
            error!("Failed to flush headless stdout: {}", e);
        }
    }

    /// Get current timestamp in milliseconds
    fn now() -> i64 {
        Utc::now().timestamp_millis()
    }

    pub fn error(message: String, fatal: bool) -> Self {
        Self::Error {
            message,
            fatal,
            timestamp: Self::now(),
        }
    }
}

impl From<&BootstrapEvent> for HeadlessEvent {
    fn from(event: &BootstrapEvent) -> Self {
        let timestamp = Self::now();
        match event.clone() {
            BootstrapEvent::Started { attempt } => Self::Started { attempt, timestamp },
            BootstrapEvent::StateChanged { attempt, state } => Self::StateChanged {
                attempt,
                state,
                timestamp,
            },
            BootstrapEvent::ProfileLoaded {
                attempt,
                library_count,
                eligible_count,
            } => Self::ProfileLoaded {
                attempt,
                library_count,
                eligible_count,
                timestamp,
            },
            BootstrapEvent::ViewsLoaded {
                attempt,
                named_count,
            } => Self::ViewsLoaded {
                attempt,
                named_count,
                timestamp,
            },
            BootstrapEvent::ViewsFailed { attempt, reason } => Self::ViewsFailed {
                attempt,
                reason,
                timestamp,
            },
            BootstrapEvent::Finished { attempt, status } => Self::Finished {
                attempt,
                status,
                timestamp,
            },
        }
    }
}
