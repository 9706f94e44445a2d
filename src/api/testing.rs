//! Scripted transport double for unit tests

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::transport::{HttpRequest, HttpResponse, Method, Transport, TransportError};

#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub authorization: Option<String>,
    pub body: Option<serde_json::Value>,
}

type Handler = dyn Fn(&Recorded) -> Result<HttpResponse, TransportError> + Send + Sync;

/// Transport that answers from a closure and records every request.
///
/// Paths are recorded relative to `base` so assertions read like routes.
pub struct ScriptedTransport {
    base: String,
    handler: Box<Handler>,
    requests: Mutex<Vec<Recorded>>,
    delay: Option<(String, Duration)>,
}

impl ScriptedTransport {
    pub fn new<F>(base: &str, handler: F) -> Self
    where
        F: Fn(&Recorded) -> Result<HttpResponse, TransportError> + Send + Sync + 'static,
    {
        Self {
            base: base.trim_end_matches('/').to_string(),
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    /// Sleep before answering requests to `path`.
    pub fn with_delay(mut self, path: &str, delay: Duration) -> Self {
        self.delay = Some((path.to_string(), delay));
        self
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }
}

pub fn respond(status: u16, body: serde_json::Value) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse {
        status,
        body: body.to_string(),
    })
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let recorded = Recorded {
            method: request.method,
            path: request
                .url
                .strip_prefix(&self.base)
                .unwrap_or(&request.url)
                .to_string(),
            query: request.query.clone(),
            authorization: request.bearer.as_ref().map(|t| t.header_value()),
            body: request
                .body
                .as_deref()
                .map(|b| serde_json::from_str(b).expect("request body should be JSON")),
        };
        self.requests.lock().unwrap().push(recorded.clone());

        if let Some((path, delay)) = &self.delay {
            if *path == recorded.path {
                tokio::time::sleep(*delay).await;
            }
        }

        (self.handler)(&recorded)
    }
}

/// Unsigned JWT with the given `exp` claim (header and signature are dummies).
pub fn jwt_with_exp(exp: i64) -> String {
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{exp},"user_id":1}}"#));
    format!("{header}.{payload}.signature")
}

pub fn user_json(id: u64, username: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "username": username,
        "email": format!("{username}@example.com"),
        "first_name": "",
        "last_name": "",
        "profile": {
            "bio": "", "avatar": null, "github_url": "", "linkedin_url": "", "website_url": ""
        }
    })
}

pub fn challenge_json(id: u64, title: &str, difficulty: &str, category: u64) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": title,
        "description": format!("{title} description"),
        "difficulty": difficulty,
        "points": 10 * id,
        "category": {
            "id": category,
            "name": format!("cat-{category}"),
            "description": "",
            "icon": "code",
            "created_at": "2026-01-01T00:00:00Z"
        },
        "created_at": "2026-01-02T00:00:00Z"
    })
}

pub fn page_json(results: Vec<serde_json::Value>) -> serde_json::Value {
    serde_json::json!({
        "count": results.len(),
        "next": null,
        "previous": null,
        "results": results,
    })
}
