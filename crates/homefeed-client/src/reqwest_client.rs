//! [`HttpClient`] backed by `reqwest`.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, USER_AGENT};

use homefeed_core::prelude::*;
use homefeed_core::TransportError;

use crate::transport::{HttpClient, HttpRequest, Method};

/// Connection-level options shared by every request.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            user_agent: format!("homefeed/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Production HTTP client.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    http: reqwest::Client,
}

impl ReqwestClient {
    pub fn new(options: &ClientOptions) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&options.user_agent)
                .map_err(|e| Error::config(format!("invalid user agent: {}", e)))?,
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(options.timeout.max(Duration::from_millis(1)))
            .build()
            .map_err(|e| Error::config(format!("failed to create http client: {}", e)))?;

        Ok(Self { http })
    }
}

impl HttpClient for ReqwestClient {
    async fn send(&self, request: HttpRequest) -> std::result::Result<Vec<u8>, TransportError> {
        let headers = build_headers(&request)?;
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
        };

        debug!("{} {}", request.method.as_str(), request.url);

        let response = self
            .http
            .request(method, &request.url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, &request.url))?;

        let status = response.status();
        if !status.is_success() {
            debug!("{} answered {}", request.url, status);
            return Err(TransportError::status(status.as_u16(), &request.url));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| map_reqwest_error(e, &request.url))?;
        trace!("{} returned {} bytes", request.url, body.len());

        Ok(body.to_vec())
    }
}

fn build_headers(request: &HttpRequest) -> std::result::Result<HeaderMap, TransportError> {
    let mut headers = HeaderMap::new();

    for (name, value) in &request.headers {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| TransportError::InvalidHeader {
                name: name.clone(),
                message: e.to_string(),
            })?;
        headers.append(header_name, header_value(name, value)?);
    }

    if let Some(accept) = &request.accept {
        headers.insert(ACCEPT, header_value("Accept", accept)?);
    }

    Ok(headers)
}

fn header_value(name: &str, value: &str) -> std::result::Result<HeaderValue, TransportError> {
    // Never echo the value: it may carry a token.
    HeaderValue::from_str(value).map_err(|e| TransportError::InvalidHeader {
        name: name.to_string(),
        message: e.to_string(),
    })
}

fn map_reqwest_error(err: reqwest::Error, url: &str) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout {
            url: url.to_string(),
        }
    } else if let Some(status) = err.status() {
        TransportError::status(status.as_u16(), url)
    } else {
        TransportError::request(err.without_url().to_string())
    }
}
