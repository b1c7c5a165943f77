//! Client-identity authorization header
//!
//! The server parses this header structurally, so the field names, their order
//! and the quoting are part of the wire contract:
//!
//! ```text
//! X-Emby-Authorization: MediaBrowser Client="Homefeed", Device="Living Room", DeviceId="abc", Version="0.1.0", Token="xyz"
//! ```

use crate::types::{Account, Credential};

/// Header carrying the [`AuthorizationContext`]
pub const AUTHORIZATION_HEADER: &str = "X-Emby-Authorization";

/// Static identity of this client application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    pub client_name: String,
    pub client_version: String,
    pub device_name: String,
}

impl ClientIdentity {
    pub fn new(
        client_name: impl Into<String>,
        client_version: impl Into<String>,
        device_name: impl Into<String>,
    ) -> Self {
        Self {
            client_name: client_name.into(),
            client_version: client_version.into(),
            device_name: device_name.into(),
        }
    }
}

/// Formatted authorization header value for one bootstrap attempt.
///
/// Built once per attempt and shared by every request of that attempt. Never
/// persisted. `Debug` hides the value because it embeds the token.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthorizationContext {
    value: String,
}

impl AuthorizationContext {
    pub fn build(client: &ClientIdentity, account: &Account, credential: &Credential) -> Self {
        let value = format!(
            "MediaBrowser Client=\"{}\", Device=\"{}\", DeviceId=\"{}\", Version=\"{}\", Token=\"{}\"",
            sanitize(&client.client_name),
            sanitize(&client.device_name),
            sanitize(&account.device_id),
            sanitize(&client.client_version),
            sanitize(credential.token()),
        );
        Self { value }
    }

    pub fn header_name(&self) -> &'static str {
        AUTHORIZATION_HEADER
    }

    pub fn header_value(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Debug for AuthorizationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationContext").finish_non_exhaustive()
    }
}

/// Strip characters that would break the quoted `key="value"` structure.
fn sanitize(value: &str) -> String {
    value
        .chars()
        .filter(|c| *c != '"' && *c != '\r' && *c != '\n')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> ClientIdentity {
        ClientIdentity::new("Homefeed", "0.1.0", "Living Room")
    }

    #[test]
    fn test_header_format_matches_server_scheme() {
        let account = Account::new("u1", "Alice", "device-42");
        let ctx = AuthorizationContext::build(&identity(), &account, &Credential::new("tok"));

        assert_eq!(
            ctx.header_value(),
            "MediaBrowser Client=\"Homefeed\", Device=\"Living Room\", DeviceId=\"device-42\", Version=\"0.1.0\", Token=\"tok\""
        );
        assert_eq!(ctx.header_name(), "X-Emby-Authorization");
    }

    #[test]
    fn test_empty_credential_yields_empty_token_field() {
        let account = Account::new("u1", "Alice", "device-42");
        let ctx = AuthorizationContext::build(&identity(), &account, &Credential::empty());
        assert!(ctx.header_value().ends_with("Token=\"\""));
    }

    #[test]
    fn test_quotes_are_stripped_from_fields() {
        let client = ClientIdentity::new("Home\"feed", "1", "Bob's \"TV\"\n");
        let account = Account::new("u1", "Alice", "d");
        let ctx = AuthorizationContext::build(&client, &account, &Credential::new("t"));

        assert!(ctx.header_value().contains("Client=\"Homefeed\""));
        assert!(ctx.header_value().contains("Device=\"Bob's TV\""));
    }

    #[test]
    fn test_debug_does_not_leak_token() {
        let account = Account::new("u1", "Alice", "d");
        let ctx = AuthorizationContext::build(&identity(), &account, &Credential::new("secret"));
        assert!(!format!("{:?}", ctx).contains("secret"));
    }
}
