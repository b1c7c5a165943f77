//! Server endpoints and their JSON payloads.
//!
//! Both endpoints are read-only `GET`s authenticated with the
//! [`AuthorizationContext`] header:
//!
//! | Endpoint | Path | Used for |
//! |----------|------|----------|
//! | Profile  | `/Users/{id}` | library order and recently-added exclusions |
//! | Views    | `/Users/{id}/Views` | library display names |
//!
//! Payloads use PascalCase keys. Unknown keys are ignored, and missing or
//! `null` lists read as empty.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use url::Url;

use homefeed_core::prelude::*;
use homefeed_core::AuthorizationContext;

use crate::transport::HttpRequest;

pub const JSON_CONTENT_TYPE: &str = "application/json";

// ---------------------------------------------------------------------------
// Request building
// ---------------------------------------------------------------------------

/// `{base}/Users/{account_id}`
pub fn profile_url(base_address: &str, account_id: &str) -> Result<String> {
    user_url(base_address, account_id, &[])
}

/// `{base}/Users/{account_id}/Views`
pub fn views_url(base_address: &str, account_id: &str) -> Result<String> {
    user_url(base_address, account_id, &["Views"])
}

/// Request A: the account's profile and configuration
pub fn profile_request(
    base_address: &str,
    account_id: &str,
    auth: &AuthorizationContext,
) -> Result<HttpRequest> {
    Ok(authorized_get(profile_url(base_address, account_id)?, auth))
}

/// Request B: the account's library views
pub fn views_request(
    base_address: &str,
    account_id: &str,
    auth: &AuthorizationContext,
) -> Result<HttpRequest> {
    Ok(authorized_get(views_url(base_address, account_id)?, auth))
}

fn authorized_get(url: String, auth: &AuthorizationContext) -> HttpRequest {
    HttpRequest::get(url)
        .with_header(auth.header_name(), auth.header_value())
        .with_accept(JSON_CONTENT_TYPE)
}

/// Parse and validate a server base address.
///
/// Only `http`/`https` addresses with a host are accepted. A path prefix
/// (reverse-proxy mount point) is kept.
pub fn parse_base_address(base_address: &str) -> Result<Url> {
    let url = Url::parse(base_address.trim()).map_err(|_| Error::invalid_address(base_address))?;

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(Error::invalid_address(base_address));
    }

    Ok(url)
}

fn user_url(base_address: &str, account_id: &str, tail: &[&str]) -> Result<String> {
    let mut url = parse_base_address(base_address)?;
    url.set_query(None);
    url.set_fragment(None);

    {
        // Pushed segments are percent-encoded, so ids cannot escape the path.
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| Error::invalid_address(base_address))?;
        segments.pop_if_empty().push("Users").push(account_id);
        segments.extend(tail);
    }

    Ok(url.into())
}

// ---------------------------------------------------------------------------
// Response payloads
// ---------------------------------------------------------------------------

/// Profile endpoint response (only the fields the home feed needs).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserProfile {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub configuration: UserConfiguration,
}

/// `Configuration` block of the profile response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserConfiguration {
    /// Library ids in the user's browse order
    #[serde(default, deserialize_with = "null_as_default")]
    pub ordered_views: Vec<String>,
    /// Library ids hidden from "recently added"
    #[serde(default, deserialize_with = "null_as_default")]
    pub latest_items_excludes: Vec<String>,
}

/// Views endpoint response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ViewsResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    items: Vec<RawView>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawView {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

/// A named library returned by the views endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryView {
    pub id: String,
    pub name: String,
}

impl LibraryView {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Parse the profile body.
///
/// A body that is not a JSON object is an error; missing fields are not.
pub fn parse_profile(body: &[u8]) -> Result<UserProfile> {
    decode_object(body, "profile")
}

/// Parse the views body, dropping items without an id.
///
/// An item without a name maps to an empty name.
pub fn parse_views(body: &[u8]) -> Result<Vec<LibraryView>> {
    let response: ViewsResponse = decode_object(body, "views")?;

    Ok(response
        .items
        .into_iter()
        .filter_map(|raw| {
            let id = raw.id.filter(|id| !id.is_empty())?;
            Some(LibraryView {
                id,
                name: raw.name.unwrap_or_default(),
            })
        })
        .collect())
}

/// Decode a body that must be a JSON object.
///
/// Derived structs would also accept a JSON array (as a sequence of fields),
/// and every field here has a default, so `[]` would decode as an empty
/// payload. Check the shape first.
fn decode_object<T: DeserializeOwned>(body: &[u8], what: &str) -> Result<T> {
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| Error::protocol(format!("{}: {}", what, e)))?;

    if !value.is_object() {
        return Err(Error::protocol(format!(
            "{}: expected a JSON object, got {}",
            what,
            json_kind(&value)
        )));
    }

    serde_json::from_value(value).map_err(|e| Error::protocol(format!("{}: {}", what, e)))
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
