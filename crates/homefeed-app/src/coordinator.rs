//! Session bootstrap coordinator
//!
//! Runs the launch sequence and publishes [`HomeFeedState`]:
//!
//! ```text
//! registry ──▶ first account ──▶ credential ──▶ AuthorizationContext
//!                                                   │
//!                       ┌───────────────────────────┘
//!                       ▼
//!        profile (Request A) ──fail──▶ signed_in_error
//!                       │ ok
//!                       ▼
//!        views (Request B) ──fail──▶ names stay empty
//!                       │
//!                       ▼
//!                     ready
//! ```
//!
//! Each attempt builds its result in a local value and publishes whole
//! snapshots. A newer `bootstrap()` call supersedes older ones: stale attempts
//! still run to completion but publish nothing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{broadcast, watch};

use homefeed_client::{
    parse_profile, parse_views, profile_request, views_request, HttpClient, LibraryView,
    UserConfiguration,
};
use homefeed_core::prelude::*;
use homefeed_core::{
    recently_added_eligible, AuthorizationContext, BootstrapStatus, ClientIdentity, Credential,
    HomeFeedState, ReauthHint,
};

use crate::credentials::CredentialStore;
use crate::event::BootstrapEvent;
use crate::registry::{AccountRegistry, ConfiguredAccount};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Library lists derived from the profile call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileLibraries {
    pub ordered_library_ids: Vec<String>,
    pub recently_added_eligible_ids: Vec<String>,
}

impl ProfileLibraries {
    /// Server order is kept verbatim, duplicates included.
    pub fn from_configuration(configuration: &UserConfiguration) -> Self {
        let ordered_library_ids = configuration.ordered_views.clone();
        let recently_added_eligible_ids =
            recently_added_eligible(&ordered_library_ids, &configuration.latest_items_excludes);

        Self {
            ordered_library_ids,
            recently_added_eligible_ids,
        }
    }
}

/// Library id -> name. Later entries win when the server repeats an id.
pub fn library_name_map(views: Vec<LibraryView>) -> HashMap<String, String> {
    let mut names = HashMap::with_capacity(views.len());
    for view in views {
        names.insert(view.id, view.name);
    }
    names
}

/// Owns the startup sequence and the published home-feed state.
pub struct SessionBootstrapCoordinator<R, C, H> {
    registry: R,
    credentials: C,
    http: H,
    client: ClientIdentity,

    /// Latest snapshot for UI sinks
    state_tx: watch::Sender<HomeFeedState>,

    /// Every transition, in order
    event_tx: broadcast::Sender<BootstrapEvent>,

    /// Number of the most recent attempt
    generation: AtomicU64,
}

impl<R, C, H> std::fmt::Debug for SessionBootstrapCoordinator<R, C, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionBootstrapCoordinator")
            .field("client", &self.client)
            .field("status", &self.state_tx.borrow().status)
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .finish()
    }
}

impl<R, C, H> SessionBootstrapCoordinator<R, C, H>
where
    R: AccountRegistry,
    C: CredentialStore,
    H: HttpClient + Sync,
{
    pub fn new(registry: R, credentials: C, http: H, client: ClientIdentity) -> Self {
        let (state_tx, _) = watch::channel(HomeFeedState::loading());
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            registry,
            credentials,
            http,
            client,
            state_tx,
            event_tx,
            generation: AtomicU64::new(0),
        }
    }

    /// Current snapshot
    pub fn state(&self) -> HomeFeedState {
        self.state_tx.borrow().clone()
    }

    /// Watch the latest snapshot
    pub fn subscribe(&self) -> watch::Receiver<HomeFeedState> {
        self.state_tx.subscribe()
    }

    /// Receive every event from now on
    pub fn subscribe_events(&self) -> broadcast::Receiver<BootstrapEvent> {
        self.event_tx.subscribe()
    }

    /// Run the startup sequence once.
    ///
    /// Always ends in a terminal status. Returns this attempt's final state,
    /// which is also published unless a newer attempt started meanwhile.
    #[instrument(level = "debug", skip(self))]
    pub async fn bootstrap(&self) -> HomeFeedState {
        let attempt = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        info!("Bootstrap attempt {} starting", attempt);

        self.emit(attempt, BootstrapEvent::Started { attempt });
        self.publish(attempt, HomeFeedState::loading(), false);

        let state = self.run(attempt).await;

        if self.publish(attempt, state.clone(), true) {
            if state.is_ready() {
                info!(
                    "Bootstrap attempt {} ready with {} libraries",
                    attempt,
                    state.ordered_library_ids.len()
                );
            } else {
                info!("Bootstrap attempt {} finished: {}", attempt, state.status);
            }
        } else {
            debug!("Bootstrap attempt {} was superseded, result discarded", attempt);
        }

        state
    }

    async fn run(&self, attempt: u64) -> HomeFeedState {
        let Some(selected) = self.select_account() else {
            return HomeFeedState::needs_server_selection();
        };
        let ConfiguredAccount { account, server } = &selected;

        let credential = self
            .credentials
            .lookup(&account.account_id)
            .unwrap_or_else(|| {
                debug!("No stored credential for account {}", account.account_id);
                Credential::empty()
            });
        let auth = AuthorizationContext::build(&self.client, account, &credential);

        let libraries = match self.fetch_profile(&selected, &auth).await {
            Ok(libraries) => libraries,
            Err(e) => {
                match &e {
                    Error::Transport(transport) if transport.is_unauthorized() => warn!(
                        "Credential for account {} was rejected by {}",
                        account.account_id, server.base_address
                    ),
                    _ => warn!(
                        "Profile request failed for account {} on {}: {}",
                        account.account_id, server.base_address, e
                    ),
                }
                return HomeFeedState::signed_in_error(ReauthHint::new(account, server));
            }
        };

        self.emit(
            attempt,
            BootstrapEvent::ProfileLoaded {
                attempt,
                library_count: libraries.ordered_library_ids.len(),
                eligible_count: libraries.recently_added_eligible_ids.len(),
            },
        );

        let library_names = match self.fetch_views(&selected, &auth).await {
            Ok(views) => {
                let names = library_name_map(views);
                self.emit(
                    attempt,
                    BootstrapEvent::ViewsLoaded {
                        attempt,
                        named_count: names.len(),
                    },
                );
                names
            }
            Err(e) => {
                warn!("Views request failed, library names unavailable: {}", e);
                self.emit(
                    attempt,
                    BootstrapEvent::ViewsFailed {
                        attempt,
                        reason: e.to_string(),
                    },
                );
                HashMap::new()
            }
        };

        HomeFeedState {
            ordered_library_ids: libraries.ordered_library_ids,
            library_names,
            recently_added_eligible_ids: libraries.recently_added_eligible_ids,
            status: BootstrapStatus::Ready,
            reauth: None,
        }
    }

    fn select_account(&self) -> Option<ConfiguredAccount> {
        match self.registry.list_configured() {
            Ok(configured) => {
                let first = configured.into_iter().next();
                match &first {
                    Some(selected) => debug!(
                        "Selected account {} on server {}",
                        selected.account.account_id, selected.server.server_id
                    ),
                    None => info!("No configured server, server selection needed"),
                }
                first
            }
            Err(e) => {
                warn!("Failed to read account registry: {}", e);
                None
            }
        }
    }

    async fn fetch_profile(
        &self,
        selected: &ConfiguredAccount,
        auth: &AuthorizationContext,
    ) -> Result<ProfileLibraries> {
        let request = profile_request(
            &selected.server.base_address,
            &selected.account.account_id,
            auth,
        )?;
        let body = self.http.send(request).await?;
        let profile = parse_profile(&body)?;

        match profile.id.as_deref() {
            Some(id) if id != selected.account.account_id => warn!(
                "Server returned profile {} for account {}",
                id, selected.account.account_id
            ),
            _ => {}
        }
        debug!(
            "Loaded profile {}",
            profile.name.as_deref().unwrap_or(&selected.account.display_name)
        );

        Ok(ProfileLibraries::from_configuration(&profile.configuration))
    }

    async fn fetch_views(
        &self,
        selected: &ConfiguredAccount,
        auth: &AuthorizationContext,
    ) -> Result<Vec<LibraryView>> {
        let request = views_request(
            &selected.server.base_address,
            &selected.account.account_id,
            auth,
        )?;
        let body = self.http.send(request).await?;
        parse_views(&body)
    }

    /// Replace the published state if `attempt` is still current.
    ///
    /// The generation check, the state swap and the `StateChanged` event all
    /// happen under the watch lock, so observers never see a superseded
    /// attempt's state after a newer attempt's. With `finished`, the
    /// `Finished` event goes out under the same lock, so a published
    /// terminal state is always followed by its `Finished`.
    fn publish(&self, attempt: u64, state: HomeFeedState, finished: bool) -> bool {
        self.state_tx.send_if_modified(|current| {
            if !self.is_current(attempt) {
                return false;
            }
            *current = state.clone();
            let status = state.status;
            // No subscribers is fine
            let _ = self
                .event_tx
                .send(BootstrapEvent::StateChanged { attempt, state });
            if finished {
                let _ = self
                    .event_tx
                    .send(BootstrapEvent::Finished { attempt, status });
            }
            true
        })
    }

    /// Broadcast an event if `attempt` is still current.
    fn emit(&self, attempt: u64, event: BootstrapEvent) {
        // Taken under the watch lock to keep events ordered with `publish`.
        self.state_tx.send_if_modified(|_| {
            if self.is_current(attempt) {
                trace!("Emitting {} for attempt {}", event.event_type(), attempt);
                let _ = self.event_tx.send(event);
            }
            false
        });
    }

    fn is_current(&self, attempt: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == attempt
    }
}
