//! # homefeed-core - Core Domain Types
//!
//! Foundation crate for Homefeed. Provides the account/server/credential
//! model, the authorization header, the published home-feed state, error
//! handling and logging setup.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, thiserror, tracing).
//!
//! ## Public API
//!
//! ### Domain Types (`types`)
//! - [`Account`] - A signed-in user on one server
//! - [`ServerConnection`] - A configured server
//! - [`Credential`] - Opaque bearer token, keyed by [`credential_key()`]
//!
//! ### Authorization (`auth`)
//! - [`ClientIdentity`] - Client name, version and device name
//! - [`AuthorizationContext`] - The `X-Emby-Authorization` header value
//!
//! ### Home Feed (`feed`)
//! - [`HomeFeedState`] - Library order, names and recently-added eligibility
//! - [`BootstrapStatus`] - Loading / needs server / signed-in error / ready
//! - [`ReauthHint`] - Pre-fill data for re-authentication
//! - [`recently_added_eligible()`] - Order-preserving exclusion filter
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum with `fatal` vs `recoverable` classification
//! - [`TransportError`] - Failure of a single HTTP exchange
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use homefeed_core::prelude::*;
//! ```

pub mod auth;
pub mod error;
pub mod feed;
pub mod logging;
pub mod prelude;
pub mod types;

// Re-export commonly used types at crate root for convenience
pub use auth::{AuthorizationContext, ClientIdentity, AUTHORIZATION_HEADER};
pub use error::{Error, Result, ResultExt, TransportError};
pub use feed::{recently_added_eligible, BootstrapStatus, HomeFeedState, ReauthHint};
pub use types::{credential_key, Account, Credential, ServerConnection};
