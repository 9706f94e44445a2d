//! HTTP plumbing for the platform API
//!
//! [`ApiClient`] owns the auth interceptor; facades in `services` build
//! [`ApiRequest`]s and let the client handle tokens.

mod auth;
mod client;
mod refresh;
mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use auth::{BearerToken, BearerTokenError};
pub use client::{ApiClient, ApiRequest, Attempt, AuthEvent, AuthPolicy, REFRESH_PATH};
pub use refresh::RefreshFailure;
pub use transport::{HttpRequest, HttpResponse, Method, Transport, TransportError, UreqTransport};
