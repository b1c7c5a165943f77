//! Headless bootstrap runner
//!
//! Wires the file-backed registry and credential store, the reqwest client and
//! the coordinator together, runs one bootstrap and streams its events to
//! stdout.

use tokio::sync::broadcast::{self, error::RecvError};

use homefeed_app::config::{load_settings, ConfigPaths};
use homefeed_app::{
    BootstrapEvent, FileAccountRegistry, FileCredentialStore, SessionBootstrapCoordinator,
};
use homefeed_client::ReqwestClient;
use homefeed_core::prelude::*;
use homefeed_core::BootstrapStatus;

use super::HeadlessEvent;

/// Process exit code for a bootstrap that ended in `signed_in_error`
pub const EXIT_SIGNED_IN_ERROR: u8 = 2;

/// Process exit code when no terminal status was reached
pub const EXIT_INCOMPLETE: u8 = 1;

/// Run one bootstrap, printing NDJSON events. Returns the terminal status.
pub async fn run_bootstrap(paths: &ConfigPaths) -> Result<BootstrapStatus> {
    info!("Homefeed bootstrap starting");
    info!("Config directory: {}", paths.dir.display());

    let settings = load_settings(paths);
    let http = match ReqwestClient::new(&settings.client_options()) {
        Ok(http) => http,
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            HeadlessEvent::error(e.to_string(), true).emit();
            return Err(e);
        }
    };

    let coordinator = SessionBootstrapCoordinator::new(
        FileAccountRegistry::new(paths.servers_file()),
        FileCredentialStore::new(paths.credentials_file()),
        http,
        settings.client_identity(),
    );

    // Subscribe before starting so no event is missed
    let mut events = coordinator.subscribe_events();
    let (state, streamed) = tokio::join!(coordinator.bootstrap(), stream_events(&mut events));

    match streamed {
        Ok(status) if status != state.status => warn!(
            "Streamed status {} differs from final state {}",
            status, state.status
        ),
        Ok(_) => {}
        // The final state is known even if the stream broke
        Err(e) if e.is_recoverable() => warn!("Event stream ended early: {}", e),
        Err(e) => return Err(e),
    }

    info!("Homefeed bootstrap exiting: {}", state.status);
    Ok(state.status)
}

/// Print events until the attempt finishes
async fn stream_events(
    events: &mut broadcast::Receiver<BootstrapEvent>,
) -> Result<BootstrapStatus> {
    loop {
        match events.recv().await {
            Ok(event) => {
                HeadlessEvent::from(&event).emit();
                if let BootstrapEvent::Finished { status, .. } = event {
                    return Ok(status);
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("Headless output fell behind, {} events skipped", skipped);
            }
            Err(RecvError::Closed) => {
                info!("Event channel closed");
                return Err(Error::ChannelClosed);
            }
        }
    }
}

/// Exit code for the status a bootstrap ended in
pub fn exit_code(status: BootstrapStatus) -> u8 {
    if !status.is_terminal() {
        return EXIT_INCOMPLETE;
    }
    match status {
        BootstrapStatus::SignedInError => EXIT_SIGNED_IN_ERROR,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use homefeed_app::{MemoryAccountRegistry, MemoryCredentialStore};
    use homefeed_client::test_utils::FakeHttpClient;
    use homefeed_core::ClientIdentity;

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(BootstrapStatus::Ready), 0);
        assert_eq!(exit_code(BootstrapStatus::NeedsServerSelection), 0);
        assert_eq!(exit_code(BootstrapStatus::SignedInError), 2);
        assert_eq!(exit_code(BootstrapStatus::Loading), EXIT_INCOMPLETE);
    }

    #[tokio::test]
    async fn test_stream_events_stops_at_finished() {
        let coordinator = SessionBootstrapCoordinator::new(
            MemoryAccountRegistry::new(),
            MemoryCredentialStore::new(),
            FakeHttpClient::new(),
            ClientIdentity::new("Homefeed", "0.1.0", "Test"),
        );
        let mut events = coordinator.subscribe_events();

        let (state, streamed) =
            tokio::join!(coordinator.bootstrap(), stream_events(&mut events));

        assert_eq!(state.status, BootstrapStatus::NeedsServerSelection);
        assert_eq!(streamed.unwrap(), BootstrapStatus::NeedsServerSelection);
    }

    #[tokio::test]
    async fn test_stream_events_reports_closed_channel() {
        let (tx, mut rx) = broadcast::channel::<BootstrapEvent>(4);
        tx.send(BootstrapEvent::Started { attempt: 1 }).unwrap();
        drop(tx);

        let result = stream_events(&mut rx).await;
        assert!(matches!(result, Err(Error::ChannelClosed)));
    }

    #[tokio::test]
    async fn test_run_bootstrap_without_servers() {
        let temp = tempfile::tempdir().unwrap();
        let paths = ConfigPaths::new(temp.path());

        let status = run_bootstrap(&paths).await.unwrap();
        assert_eq!(status, BootstrapStatus::NeedsServerSelection);
    }
}
