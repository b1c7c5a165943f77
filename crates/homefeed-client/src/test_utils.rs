//! Test utilities for the HTTP layer
//!
//! [`FakeHttpClient`] answers requests from a per-route script and records
//! every request it receives, so tests can assert on call order and count.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use homefeed_core::TransportError;

use crate::transport::{HttpClient, HttpRequest};

type Reply = Result<Vec<u8>, TransportError>;

#[derive(Default)]
struct Script {
    /// Route suffix -> queued replies. The last reply of a queue is sticky.
    replies: HashMap<String, VecDeque<Reply>>,
    /// Route suffix -> delays applied before replying, consumed in order
    delays: HashMap<String, VecDeque<Duration>>,
    requests: Vec<HttpRequest>,
}

/// Scripted [`HttpClient`].
///
/// Routes are matched by URL suffix, longest suffix first, so
/// `"/Users/u1"` and `"/Users/u1/Views"` can be scripted independently.
/// Unscripted routes answer HTTP 404. Clones share the same script.
#[derive(Clone, Default)]
pub struct FakeHttpClient {
    script: Arc<Mutex<Script>>,
}

impl FakeHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful JSON body for `route`
    pub fn respond_json(&self, route: &str, body: serde_json::Value) -> &Self {
        self.push(route, Ok(body.to_string().into_bytes()))
    }

    /// Queue a raw body for `route`
    pub fn respond_bytes(&self, route: &str, body: &[u8]) -> &Self {
        self.push(route, Ok(body.to_vec()))
    }

    /// Queue an HTTP error status for `route`
    pub fn respond_status(&self, route: &str, status: u16) -> &Self {
        self.push(route, Err(TransportError::status(status, route)))
    }

    /// Queue a transport failure for `route`
    pub fn respond_error(&self, route: &str, error: TransportError) -> &Self {
        self.push(route, Err(error))
    }

    /// Delay the next reply on `route` by `delay`
    pub fn delay_next(&self, route: &str, delay: Duration) -> &Self {
        self.lock()
            .delays
            .entry(route.to_string())
            .or_default()
            .push_back(delay);
        self
    }

    /// Every request received so far, in order
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.lock().requests.clone()
    }

    /// Number of requests whose URL ends with `route`
    pub fn call_count(&self, route: &str) -> usize {
        self.lock()
            .requests
            .iter()
            .filter(|r| r.url.ends_with(route))
            .count()
    }

    fn push(&self, route: &str, reply: Reply) -> &Self {
        self.lock()
            .replies
            .entry(route.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record the request and pick its reply and delay
    fn take(&self, request: HttpRequest) -> (Reply, Option<Duration>) {
        let mut script = self.lock();
        let url = request.url.clone();
        script.requests.push(request);

        let route = script
            .replies
            .keys()
            .filter(|route| url.ends_with(route.as_str()))
            .max_by_key(|route| route.len())
            .cloned();

        let Some(route) = route else {
            return (Err(TransportError::status(404, url)), None);
        };

        let delay = script
            .delays
            .get_mut(&route)
            .and_then(|delays| delays.pop_front());

        let reply = match script.replies.get_mut(&route) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        }
        .unwrap_or_else(|| Err(TransportError::status(404, url)));

        (reply, delay)
    }
}

impl HttpClient for FakeHttpClient {
    async fn send(&self, request: HttpRequest) -> Result<Vec<u8>, TransportError> {
        let (reply, delay) = self.take(request);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        reply
    }
}

/// Profile body with the given library order and exclusions
pub fn profile_body(ordered_views: &[&str], latest_items_excludes: &[&str]) -> serde_json::Value {
    serde_json::json!({
        "Id": "u1",
        "Name": "Test User",
        "Configuration": {
            "OrderedViews": ordered_views,
            "LatestItemsExcludes": latest_items_excludes,
        }
    })
}

/// Views body from `(id, name)` pairs
pub fn views_body(items: &[(&str, &str)]) -> serde_json::Value {
    let items: Vec<serde_json::Value> = items
        .iter()
        .map(|(id, name)| serde_json::json!({ "Id": id, "Name": name }))
        .collect();
    serde_json::json!({ "Items": items, "TotalRecordCount": items.len() })
}
