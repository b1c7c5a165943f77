//! Events emitted by the coordinator for external consumers
//!
//! The watch channel only guarantees the latest [`HomeFeedState`]. Subscribers
//! that need every transition (headless output, UI animations) use these
//! events instead, delivered in order via `subscribe_events()`.

use serde::Serialize;

use homefeed_core::{BootstrapStatus, HomeFeedState};

/// Bootstrap progress events.
///
/// Every event carries the attempt number. Only the current attempt emits, so
/// consumers never see a superseded attempt interleaved with a newer one.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BootstrapEvent {
    /// A bootstrap attempt began
    Started { attempt: u64 },

    /// A new state snapshot was published
    StateChanged { attempt: u64, state: HomeFeedState },

    /// The profile call succeeded
    ProfileLoaded {
        attempt: u64,
        library_count: usize,
        eligible_count: usize,
    },

    /// The views call succeeded
    ViewsLoaded { attempt: u64, named_count: usize },

    /// The views call failed; library names stay empty
    ViewsFailed { attempt: u64, reason: String },

    /// The attempt reached its terminal status
    Finished {
        attempt: u64,
        status: BootstrapStatus,
    },
}

impl BootstrapEvent {
    /// Returns a short string label for this event type (for logging/debugging).
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Started { .. } => "started",
            Self::StateChanged { .. } => "state_changed",
            Self::ProfileLoaded { .. } => "profile_loaded",
            Self::ViewsLoaded { .. } => "views_loaded",
            Self::ViewsFailed { .. } => "views_failed",
            Self::Finished { .. } => "finished",
        }
    }

    pub fn attempt(&self) -> u64 {
        match self {
            Self::Started { attempt }
            | Self::StateChanged { attempt, .. }
            | Self::ProfileLoaded { attempt, .. }
            | Self::ViewsLoaded { attempt, .. }
            | Self::ViewsFailed { attempt, .. }
            | Self::Finished { attempt, .. } => *attempt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_labels() {
        assert_eq!(BootstrapEvent::Started { attempt: 1 }.event_type(), "started");
        assert_eq!(
            BootstrapEvent::ViewsFailed {
                attempt: 1,
                reason: "HTTP 500".into()
            }
            .event_type(),
            "views_failed"
        );
        assert_eq!(
            BootstrapEvent::Finished {
                attempt: 3,
                status: BootstrapStatus::Ready
            }
            .attempt(),
            3
        );
    }

    #[test]
    fn test_event_serializes_with_tag() {
        let event = BootstrapEvent::StateChanged {
            attempt: 2,
            state: HomeFeedState::needs_server_selection(),
        };
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["event"], "state_changed");
        assert_eq!(json["attempt"], 2);
        assert_eq!(json["state"]["status"], "needs_server_selection");
    }
}
