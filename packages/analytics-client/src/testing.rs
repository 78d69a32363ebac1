//! Testing utilities including a mock transport.
//!
//! Useful for exercising the client without a running backend.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use url::Url;

use crate::error::{AnalyticsError, Result};
use crate::transport::{HttpResponse, HttpTransport};

/// A mock transport with canned responses per endpoint.
///
/// Routes are matched on the end of the request path, so a base address with
/// its own path prefix still resolves. Clones share routes and call history.
#[derive(Default, Clone)]
pub struct MockTransport {
    /// Canned outcomes by endpoint
    routes: Arc<RwLock<HashMap<String, MockRoute>>>,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<Url>>>,
}

#[derive(Debug, Clone)]
struct MockRoute {
    outcome: MockOutcome,
    delay: Option<Duration>,
}

#[derive(Debug, Clone)]
enum MockOutcome {
    Respond(HttpResponse),
    Fail(String),
}

impl MockTransport {
    /// Create a mock with no routes; unknown endpoints answer 404.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `endpoint` with 200 and the given JSON body.
    pub fn with_json(self, endpoint: impl Into<String>, body: serde_json::Value) -> Self {
        self.with_response(endpoint, HttpResponse::new(200, body.to_string()))
    }

    /// Answer `endpoint` with an empty body and the given status.
    pub fn with_status(self, endpoint: impl Into<String>, status: u16) -> Self {
        self.with_response(endpoint, HttpResponse::new(status, ""))
    }

    /// Answer `endpoint` with an arbitrary response.
    pub fn with_response(self, endpoint: impl Into<String>, response: HttpResponse) -> Self {
        self.insert(endpoint.into(), MockOutcome::Respond(response));
        self
    }

    /// Make `endpoint` fail at the transport level.
    pub fn fail_endpoint(self, endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        self.insert(endpoint.into(), MockOutcome::Fail(message.into()));
        self
    }

    /// Delay the answer for an already registered `endpoint`.
    pub fn with_delay(self, endpoint: &str, delay: Duration) -> Self {
        if let Some(route) = self.routes.write().unwrap().get_mut(endpoint) {
            route.delay = Some(delay);
        }
        self
    }

    /// Get all request URLs seen so far.
    pub fn calls(&self) -> Vec<Url> {
        self.calls.read().unwrap().clone()
    }

    fn insert(&self, endpoint: String, outcome: MockOutcome) {
        self.routes.write().unwrap().insert(
            endpoint,
            MockRoute {
                outcome,
                delay: None,
            },
        );
    }

    fn route_for(&self, url: &Url) -> Option<MockRoute> {
        self.routes
            .read()
            .unwrap()
            .iter()
            .find(|(endpoint, _)| url.path().ends_with(endpoint.as_str()))
            .map(|(_, route)| route.clone())
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn get(&self, url: &Url) -> Result<HttpResponse> {
        self.calls.write().unwrap().push(url.clone());

        let Some(route) = self.route_for(url) else {
            return Ok(HttpResponse::new(404, ""));
        };

        if let Some(delay) = route.delay {
            tokio::time::sleep(delay).await;
        }

        match route.outcome {
            MockOutcome::Respond(response) => Ok(response),
            MockOutcome::Fail(message) => Err(AnalyticsError::Network(message)),
        }
    }
}
