//! # homefeed-client - Media-Server HTTP Layer
//!
//! Sends single authenticated requests to the media server and decodes the two
//! payloads the home feed is built from.
//!
//! Depends on [`homefeed_core`] for domain types and error handling.
//!
//! ## Public API
//!
//! ### Transport
//! - [`HttpClient`] - Send one request, get the body or a [`TransportError`](homefeed_core::TransportError)
//! - [`HttpRequest`], [`Method`] - Body-less request description
//! - [`ReqwestClient`] - Production implementation
//!
//! ### Protocol
//! - [`profile_request()`], [`views_request()`] - Authenticated endpoint requests
//! - [`parse_profile()`] - Library order and recently-added exclusions
//! - [`parse_views()`] - Library display names
//! - [`parse_base_address()`] - Server address validation

pub mod protocol;
pub mod reqwest_client;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils;
pub mod transport;

pub use protocol::{
    parse_base_address, parse_profile, parse_views, profile_request, profile_url, views_request,
    views_url, LibraryView, UserConfiguration, UserProfile,
};
pub use reqwest_client::{ClientOptions, ReqwestClient};
pub use transport::{HttpClient, HttpRequest, LocalHttpClient, Method};
