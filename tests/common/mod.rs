//! Shared test utilities: a stub backend on a real socket

#![allow(dead_code)]

use std::io::Read;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use tiny_http::{Header, Response, Server};

/// A request as the stub backend saw it.
#[derive(Debug, Clone)]
pub struct StubRequest {
    pub method: String,
    /// Path relative to `/api`, without the query string
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

impl StubRequest {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("request body should be JSON")
    }
}

type Handler = dyn Fn(&StubRequest) -> (u16, serde_json::Value) + Send + 'static;

/// HTTP server on an ephemeral port answering from a closure.
///
/// Stops when dropped.
pub struct StubBackend {
    base_url: String,
    server: Arc<Server>,
    requests: Arc<Mutex<Vec<StubRequest>>>,
    worker: Option<JoinHandle<()>>,
}

impl StubBackend {
    pub fn start<F>(handler: F) -> Self
    where
        F: Fn(&StubRequest) -> (u16, serde_json::Value) + Send + 'static,
    {
        let server = Arc::new(Server::http("127.0.0.1:0").expect("Failed to bind stub backend"));
        let addr = server
            .server_addr()
            .to_ip()
            .expect("Stub backend should listen on TCP");
        let requests = Arc::new(Mutex::new(Vec::new()));

        let worker = {
            let server = Arc::clone(&server);
            let requests = Arc::clone(&requests);
            let handler: Box<Handler> = Box::new(handler);
            std::thread::spawn(move || serve(&server, &requests, &*handler))
        };

        Self {
            base_url: format!("http://{addr}/api"),
            server,
            requests,
            worker: Some(worker),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn requests(&self) -> Vec<StubRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: &str, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }
}

impl Drop for StubBackend {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn serve(server: &Server, requests: &Mutex<Vec<StubRequest>>, handler: &Handler) {
    while let Ok(mut request) = server.recv() {
        let mut body = String::new();
        let _ = request.as_reader().read_to_string(&mut body);

        let header = |name: &'static str| {
            request
                .headers()
                .iter()
                .find(|h| h.field.equiv(name))
                .map(|h| h.value.as_str().to_string())
        };
        let (path, query) = match request.url().split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string())),
            None => (request.url().to_string(), None),
        };
        let seen = StubRequest {
            method: request.method().to_string(),
            path: path.strip_prefix("/api").unwrap_or(&path).to_string(),
            query,
            authorization: header("Authorization"),
            content_type: header("Content-Type"),
            body,
        };
        requests.lock().unwrap().push(seen.clone());

        let (status, payload) = handler(&seen);
        let response = Response::from_string(payload.to_string())
            .with_status_code(status)
            .with_header(
                Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap(),
            );
        let _ = request.respond(response);
    }
}

/// Unsigned JWT whose `exp` is `secs_from_now` seconds away.
pub fn jwt_expiring_in(secs_from_now: i64) -> String {
    let exp = chrono::Utc::now().timestamp() + secs_from_now;
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"token_type":"access","exp":{exp}}}"#));
    format!("{header}.{payload}.sig")
}

pub fn user_json(id: u64, username: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "username": username,
        "email": format!("{username}@example.com"),
        "first_name": "",
        "last_name": "",
        "profile": {"bio": "", "avatar": null, "github_url": "", "linkedin_url": "", "website_url": ""}
    })
}
