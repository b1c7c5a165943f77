//! Home-feed state published by the bootstrap
//!
//! [`HomeFeedState`] is always replaced as a whole. Readers never see the
//! library lists of one attempt combined with the status of another.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::types::{Account, ServerConnection};

/// Bootstrap progress as seen by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BootstrapStatus {
    /// A bootstrap attempt is in flight
    #[default]
    Loading,
    /// No server/account is configured yet
    NeedsServerSelection,
    /// The stored credential was rejected (or the profile call failed)
    SignedInError,
    /// The bootstrap sequence finished; library names may still be partial
    Ready,
}

impl BootstrapStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, BootstrapStatus::Loading)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BootstrapStatus::Loading => "loading",
            BootstrapStatus::NeedsServerSelection => "needs_server_selection",
            BootstrapStatus::SignedInError => "signed_in_error",
            BootstrapStatus::Ready => "ready",
        }
    }
}

impl std::fmt::Display for BootstrapStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the UI needs to offer a pre-filled re-authentication screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReauthHint {
    pub server_id: String,
    pub server_address: String,
    pub account_id: String,
    pub display_name: String,
    pub device_id: String,
}

impl ReauthHint {
    pub fn new(account: &Account, server: &ServerConnection) -> Self {
        Self {
            server_id: server.server_id.clone(),
            server_address: server.base_address.clone(),
            account_id: account.account_id.clone(),
            display_name: account.display_name.clone(),
            device_id: account.device_id.clone(),
        }
    }
}

/// Observable result of a bootstrap attempt.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct HomeFeedState {
    /// Library ids in the user's configured browse order
    pub ordered_library_ids: Vec<String>,
    /// Library id to display name; ids the server did not name are absent
    pub library_names: HashMap<String, String>,
    /// Subsequence of `ordered_library_ids` not excluded from "recently added"
    pub recently_added_eligible_ids: Vec<String>,
    pub status: BootstrapStatus,
    /// Only set while `status` is [`BootstrapStatus::SignedInError`]
    pub reauth: Option<ReauthHint>,
}

impl HomeFeedState {
    /// Fresh state for a new attempt
    pub fn loading() -> Self {
        Self::default()
    }

    pub fn needs_server_selection() -> Self {
        Self {
            status: BootstrapStatus::NeedsServerSelection,
            ..Self::default()
        }
    }

    /// Sign-in failure. Derived lists are empty; nothing from the failed
    /// attempt is kept.
    pub fn signed_in_error(hint: ReauthHint) -> Self {
        Self {
            status: BootstrapStatus::SignedInError,
            reauth: Some(hint),
            ..Self::default()
        }
    }

    /// Display name of a library, if the views response named it
    pub fn library_name(&self, library_id: &str) -> Option<&str> {
        self.library_names.get(library_id).map(String::as_str)
    }

    pub fn is_ready(&self) -> bool {
        self.status == BootstrapStatus::Ready
    }
}

/// Filter `ordered` down to ids absent from `excluded`, keeping order.
///
/// Duplicates in `ordered` pass through untouched; nothing is added.
pub fn recently_added_eligible(ordered: &[String], excluded: &[String]) -> Vec<String> {
    let excluded: HashSet<&str> = excluded.iter().map(String::as_str).collect();
    ordered
        .iter()
        .filter(|id| !excluded.contains(id.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_eligible_removes_excluded_preserving_order() {
        let ordered = ids(&["A", "B", "C"]);
        let eligible = recently_added_eligible(&ordered, &ids(&["B"]));
        assert_eq!(eligible, ids(&["A", "C"]));
    }

    #[test]
    fn test_eligible_with_no_exclusions_is_identity() {
        let ordered = ids(&["C", "A", "B"]);
        assert_eq!(recently_added_eligible(&ordered, &[]), ordered);
    }

    #[test]
    fn test_eligible_ignores_unknown_exclusions() {
        let ordered = ids(&["A", "B"]);
        let eligible = recently_added_eligible(&ordered, &ids(&["Z", "Y"]));
        assert_eq!(eligible, ordered);
    }

    #[test]
    fn test_eligible_everything_excluded() {
        let ordered = ids(&["A", "B"]);
        assert!(recently_added_eligible(&ordered, &ids(&["B", "A"])).is_empty());
    }

    #[test]
    fn test_eligible_is_subsequence_without_new_duplicates() {
        let ordered = ids(&["A", "B", "A", "C", "D", "B"]);
        let exclusion_sets = [
            ids(&[]),
            ids(&["A"]),
            ids(&["B", "D"]),
            ids(&["A", "B", "C", "D"]),
            ids(&["C", "C"]),
        ];

        for excluded in &exclusion_sets {
            let eligible = recently_added_eligible(&ordered, excluded);

            // Subsequence check: walk `ordered` consuming matches in order.
            let mut cursor = ordered.iter();
            for id in &eligible {
                assert!(
                    cursor.any(|candidate| candidate == id),
                    "{:?} is not a subsequence of {:?}",
                    eligible,
                    ordered
                );
            }

            for id in &eligible {
                assert!(!excluded.contains(id));
                let in_eligible = eligible.iter().filter(|x| *x == id).count();
                let in_ordered = ordered.iter().filter(|x| *x == id).count();
                assert!(in_eligible <= in_ordered);
            }
        }
    }

    #[test]
    fn test_status_terminal() {
        assert!(!BootstrapStatus::Loading.is_terminal());
        assert!(BootstrapStatus::NeedsServerSelection.is_terminal());
        assert!(BootstrapStatus::SignedInError.is_terminal());
        assert!(BootstrapStatus::Ready.is_terminal());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&BootstrapStatus::NeedsServerSelection).unwrap();
        assert_eq!(json, "\"needs_server_selection\"");
        assert_eq!(BootstrapStatus::SignedInError.to_string(), "signed_in_error");
    }

    #[test]
    fn test_signed_in_error_state_carries_hint_only() {
        let account = Account::new("u1", "Alice", "dev");
        let server = ServerConnection::new("srv", "http://media.local");
        let state = HomeFeedState::signed_in_error(ReauthHint::new(&account, &server));

        assert_eq!(state.status, BootstrapStatus::SignedInError);
        assert!(state.ordered_library_ids.is_empty());
        assert!(state.library_names.is_empty());
        let hint = state.reauth.unwrap();
        assert_eq!(hint.server_address, "http://media.local");
        assert_eq!(hint.device_id, "dev");
    }

    #[test]
    fn test_loading_state_is_empty() {
        let state = HomeFeedState::loading();
        assert_eq!(state.status, BootstrapStatus::Loading);
        assert!(state.recently_added_eligible_ids.is_empty());
        assert!(state.reauth.is_none());
        assert!(!state.is_ready());
    }
}
