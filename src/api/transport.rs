//! Raw HTTP transport
//!
//! The client builds [`HttpRequest`]s and hands them to a [`Transport`]; the
//! transport only moves bytes and reports the status. Non-2xx statuses are
//! returned as responses, never as errors.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::BearerToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    /// Absolute URL without query string
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub bearer: Option<BearerToken>,
    /// JSON-encoded body
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("failed to read response body: {0}")]
    Body(#[source] std::io::Error),

    #[error("transport task failed: {0}")]
    Task(String),
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Production transport over a shared `ureq` agent.
///
/// ureq is blocking; each request runs on tokio's blocking pool.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(connect_timeout: Duration, read_timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(connect_timeout)
            .timeout_read(read_timeout)
            .user_agent(concat!("createathon/", env!("CARGO_PKG_VERSION")))
            .build();
        Self { agent }
    }

    pub fn into_shared(self) -> Arc<dyn Transport> {
        Arc::new(self)
    }

    fn send_blocking(agent: &ureq::Agent, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut req = agent.request(request.method.as_str(), &request.url);
        for (name, value) in &request.query {
            req = req.query(name, value);
        }
        for (name, value) in &request.headers {
            req = req.set(name, value);
        }
        if let Some(token) = &request.bearer {
            req = req.set("Authorization", &token.header_value());
        }

        let result = match &request.body {
            Some(body) => req.send_string(body),
            None => req.call(),
        };

        match result {
            Ok(resp) => {
                let status = resp.status();
                let body = resp.into_string().map_err(TransportError::Body)?;
                Ok(HttpResponse { status, body })
            }
            Err(ureq::Error::Status(status, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                Ok(HttpResponse { status, body })
            }
            Err(ureq::Error::Transport(transport)) => {
                Err(TransportError::Connect(transport.to_string()))
            }
        }
    }
}

#[async_trait]
impl Transport for UreqTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let agent = self.agent.clone();
        tokio::task::spawn_blocking(move || Self::send_blocking(&agent, request))
            .await
            .map_err(|e| TransportError::Task(e.to_string()))?
    }
}
