use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Raw status and body of a GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        HttpResponse {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Seam between the API client and the network.
///
/// `Err` means no HTTP status was received at all (DNS, connect, timeout).
pub trait Transport: Send + Sync {
    fn get(&self, url: &str, token: Option<&str>) -> Result<HttpResponse, String>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn get(&self, url: &str, token: Option<&str>) -> Result<HttpResponse, String> {
        (**self).get(url, token)
    }
}

pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(concat!("league_insight/", env!("CARGO_PKG_VERSION")))
            .build();
        UreqTransport { agent }
    }
}

impl Transport for UreqTransport {
    fn get(&self, url: &str, token: Option<&str>) -> Result<HttpResponse, String> {
        let mut request = self.agent.get(url);
        if let Some(token) = token {
            request = request.set("X-Riot-Token", token);
        }

        match request.call() {
            Ok(resp) => {
                let status = resp.status();
                let body = resp.into_string().map_err(|e| e.to_string())?;
                Ok(HttpResponse { status, body })
            }
            Err(ureq::Error::Status(status, resp)) => Ok(HttpResponse {
                status,
                body: resp.into_string().unwrap_or_default(),
            }),
            Err(ureq::Error::Transport(e)) => Err(e.to_string()),
        }
    }
}

/// Canned-response transport for tests and offline runs.
///
/// Routes are matched by URL substring; the longest matching route wins so
/// `/matches/NA1_1` can coexist with `/matches/by-puuid/`.
#[derive(Default)]
pub struct MockTransport {
    routes: HashMap<String, Result<HttpResponse, String>>,
    requests: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json(mut self, route: &str, body: impl Into<String>) -> Self {
        self.routes
            .insert(route.to_string(), Ok(HttpResponse::new(200, body)));
        self
    }

    pub fn with_status(mut self, route: &str, status: u16) -> Self {
        self.routes
            .insert(route.to_string(), Ok(HttpResponse::new(status, "")));
        self
    }

    pub fn with_network_error(mut self, route: &str, message: &str) -> Self {
        self.routes
            .insert(route.to_string(), Err(message.to_string()));
        self
    }

    /// URLs requested so far, in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    pub fn request_count(&self, route: &str) -> usize {
        self.requests().iter().filter(|url| url.contains(route)).count()
    }
}

impl Transport for MockTransport {
    fn get(&self, url: &str, _token: Option<&str>) -> Result<HttpResponse, String> {
        if let Ok(mut log) = self.requests.lock() {
            log.push(url.to_string());
        }

        self.routes
            .iter()
            .filter(|(route, _)| url.contains(route.as_str()))
            .max_by_key(|(route, _)| route.len())
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| Ok(HttpResponse::new(404, "")))
    }
}
