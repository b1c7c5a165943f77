//! Single-request HTTP transport abstraction.
//!
//! The coordinator only ever needs "send one request, get the body or a
//! failure", so that is the whole contract. Implementations:
//! - [`ReqwestClient`](crate::ReqwestClient) for real servers
//! - `FakeHttpClient` (feature `test-helpers`) for scripted tests

use homefeed_core::TransportError;

/// HTTP method. The endpoints used here are all reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
        }
    }
}

/// A request without a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    /// Extra headers as `(name, value)` pairs, sent in order
    pub headers: Vec<(String, String)>,
    pub accept: Option<String>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            accept: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    /// First header value with this name (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Send one request and resolve to the response body.
///
/// Any non-2xx answer is an error ([`TransportError::Status`]).
#[trait_variant::make(HttpClient: Send)]
pub trait LocalHttpClient {
    async fn send(&self, request: HttpRequest) -> Result<Vec<u8>, TransportError>;
}
