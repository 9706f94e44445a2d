//! Authenticated API client
//!
//! Resolves paths against the base URL, attaches the stored access token and
//! recovers from an expired token by refreshing it once per request.

use std::sync::Arc;

use futures::FutureExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::refresh::{RefreshFailure, RefreshGate, RefreshOutcome};
use super::transport::{HttpRequest, HttpResponse, Method, Transport};
use super::BearerToken;
use crate::error::ApiError;
use crate::models::RefreshResponse;
use crate::storage::TokenStore;

/// Path of the token refresh endpoint, relative to the base URL.
pub const REFRESH_PATH: &str = "/token/refresh/";

const DEFAULT_HEADERS: &[(&str, &str)] = &[
    ("Content-Type", "application/json"),
    ("Accept", "application/json"),
];

/// Notifications the client raises outside the request/response flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    /// Refresh failed and the stored tokens were cleared; the user must log in again.
    SessionExpired,
}

/// Whether a 401 on this request may trigger a token refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPolicy {
    Refreshable,
    /// Credential endpoints: a 401 means bad credentials, not an expired token.
    NoRefresh,
}

/// Which try of a request this is. The first send is attempt 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attempt(u8);

impl Attempt {
    pub const MAX_RETRIES: u8 = 1;

    pub fn first() -> Self {
        Attempt(0)
    }

    pub fn number(self) -> u8 {
        self.0
    }

    pub fn is_retry(self) -> bool {
        self.0 > 0
    }

    /// The following attempt, or `None` once retries are used up.
    pub fn next(self) -> Option<Self> {
        (self.0 < Self::MAX_RETRIES).then(|| Attempt(self.0 + 1))
    }
}

/// A request relative to the API base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    pub policy: AuthPolicy,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            policy: AuthPolicy::Refreshable,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn json<B: Serialize>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::Decode(format!("failed to encode request body: {e}")))?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn query(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query = pairs;
        self
    }

    pub fn without_refresh(mut self) -> Self {
        self.policy = AuthPolicy::NoRefresh;
        self
    }
}

struct ClientInner {
    base_url: String,
    transport: Arc<dyn Transport>,
    tokens: TokenStore,
    refresh: RefreshGate,
    events: broadcast::Sender<AuthEvent>,
}

impl ClientInner {
    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// Cheap to clone; clones share the token store and the refresh gate.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

impl ApiClient {
    pub fn new(base_url: &str, transport: Arc<dyn Transport>, tokens: TokenStore) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            inner: Arc::new(ClientInner {
                base_url: base_url.trim_end_matches('/').to_string(),
                transport,
                tokens,
                refresh: RefreshGate::default(),
                events,
            }),
        }
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.inner.tokens
    }

    #[cfg(test)]
    pub(crate) fn refresh_in_flight(&self) -> bool {
        !self.inner.refresh.is_idle()
    }

    /// Subscribe to [`AuthEvent`]s raised by the interceptor.
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.inner.events.subscribe()
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(ApiRequest::get(path)).await
    }

    /// Send `request` and decode the JSON body of the success response.
    pub async fn execute<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let response = self.send(request).await?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Send `request`, applying the refresh-on-401 policy.
    ///
    /// Returns the success response; any other status is classified into an
    /// [`ApiError`]. At most one refresh and one retry happen per call.
    pub async fn send(&self, request: ApiRequest) -> Result<HttpResponse, ApiError> {
        let mut attempt = Attempt::first();
        loop {
            let sent_with = self.inner.tokens.access_token()?;
            let response = self.dispatch(&request, sent_with.as_deref(), attempt).await?;

            if response.is_success() {
                return Ok(response);
            }
            if response.status != 401 || request.policy == AuthPolicy::NoRefresh {
                return Err(ApiError::from_response(response.status, &response.body));
            }

            let Some(next) = attempt.next() else {
                debug!(path = %request.path, "still unauthorized after retry");
                return Err(ApiError::from_response(response.status, &response.body));
            };

            if let Err(failure) = self.recover(sent_with.as_deref()).await {
                debug!(path = %request.path, %failure, "token recovery failed");
                return Err(ApiError::from_response(response.status, &response.body));
            }
            attempt = next;
        }
    }

    async fn dispatch(
        &self,
        request: &ApiRequest,
        access_token: Option<&str>,
        attempt: Attempt,
    ) -> Result<HttpResponse, ApiError> {
        let bearer = access_token.map(BearerToken::try_from).transpose()?;
        let http = HttpRequest {
            method: request.method,
            url: self.inner.url(&request.path),
            query: request.query.clone(),
            headers: default_headers(),
            bearer,
            body: request.body.as_ref().map(|b| b.to_string()),
        };

        debug!(
            method = %http.method,
            url = %http.url,
            attempt = attempt.number(),
            "sending request"
        );

        let response = self
            .inner
            .transport
            .send(http)
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        debug!(status = response.status, path = %request.path, "received response");
        Ok(response)
    }

    /// Make a fresh access token available after a 401.
    ///
    /// If the stored token already differs from the one the request carried,
    /// someone else refreshed in the meantime and there is nothing to do.
    async fn recover(&self, sent_with: Option<&str>) -> RefreshOutcome {
        let current = self
            .inner
            .tokens
            .access_token()
            .map_err(|e| RefreshFailure::Storage(e.to_string()))?;
        if current.is_some() && current.as_deref() != sent_with {
            debug!("access token changed since request was sent; retrying without refresh");
            return Ok(());
        }

        let inner = Arc::clone(&self.inner);
        self.inner
            .refresh
            .join_or_start(move || refresh_access_token(inner).boxed())
            .await
    }
}

fn default_headers() -> Vec<(String, String)> {
    DEFAULT_HEADERS
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Body of the shared refresh future. Runs once per burst of 401s.
async fn refresh_access_token(inner: Arc<ClientInner>) -> RefreshOutcome {
    let outcome = request_new_access_token(&inner).await;

    // The gate stays occupied until the tokens are cleared, or a late 401
    // could start a second refresh with the revoked refresh token.
    match &outcome {
        Ok(()) => info!("access token refreshed"),
        Err(failure) => {
            warn!(%failure, "token refresh failed; clearing stored credentials");
            if let Err(e) = inner.tokens.clear() {
                warn!(error = %e, "failed to clear tokens after refresh failure");
            }
            // No subscribers is fine; nobody is waiting for the signal.
            let _ = inner.events.send(AuthEvent::SessionExpired);
        }
    }
    inner.refresh.finish();
    outcome
}

async fn request_new_access_token(inner: &ClientInner) -> RefreshOutcome {
    let refresh_token = inner
        .tokens
        .refresh_token()
        .map_err(|e| RefreshFailure::Storage(e.to_string()))?
        .ok_or(RefreshFailure::MissingRefreshToken)?;

    let request = HttpRequest {
        method: Method::Post,
        url: inner.url(REFRESH_PATH),
        query: Vec::new(),
        headers: default_headers(),
        bearer: None,
        body: Some(serde_json::json!({ "refresh": refresh_token }).to_string()),
    };

    let response = inner
        .transport
        .send(request)
        .await
        .map_err(|e| RefreshFailure::Network(e.to_string()))?;

    if !response.is_success() {
        return Err(RefreshFailure::Rejected {
            status: response.status,
        });
    }

    let body: RefreshResponse = serde_json::from_str(&response.body)
        .map_err(|e| RefreshFailure::Malformed(e.to_string()))?;

    let stored = match body.refresh {
        Some(rotated) => inner
            .tokens
            .set(&crate::storage::TokenPair::new(body.access, rotated)),
        None => inner.tokens.set_access_token(&body.access),
    };
    stored.map_err(|e| RefreshFailure::Storage(e.to_string()))
}
