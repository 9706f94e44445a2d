//! Authentication session for one CLI invocation
//!
//! [`SessionContext`] is constructed by the binary and handed to commands.
//! It owns the current [`SessionState`], writes the token store on login and
//! logout, and listens for [`AuthEvent`]s raised by the API client when a
//! token refresh fails.

pub mod jwt;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, info, warn};

use crate::api::{ApiClient, AuthEvent};
use crate::error::ApiError;
use crate::models::{ProfileUpdate, RegisterRequest, User, UserId, UserProfile};
use crate::services::AuthService;
use crate::storage::{StorageError, TokenPair, TokenStore};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("not logged in")]
    NotAuthenticated,
}

/// The logged-in user.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user_id: UserId,
    pub username: String,
    pub display_name: String,
    pub profile: Option<UserProfile>,
    pub user: User,
}

impl Session {
    pub fn from_user(user: User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            display_name: user.display_name(),
            profile: user.profile.clone(),
            user,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Uninitialized,
    /// Stored token is being validated.
    Checking,
    Authenticated(Session),
    Anonymous,
}

impl SessionState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }
}

pub struct SessionContext {
    auth: AuthService,
    tokens: TokenStore,
    events: broadcast::Receiver<AuthEvent>,
    state: SessionState,
}

impl SessionContext {
    pub fn new(
        auth: AuthService,
        tokens: TokenStore,
        events: broadcast::Receiver<AuthEvent>,
    ) -> Self {
        Self {
            auth,
            tokens,
            events,
            state: SessionState::Uninitialized,
        }
    }

    /// Wire a context to `client`'s token store and event channel.
    pub fn for_client(client: &ApiClient) -> Self {
        Self::new(
            AuthService::new(client.clone()),
            client.tokens().clone(),
            client.subscribe(),
        )
    }

    pub fn state(&mut self) -> &SessionState {
        self.drain_events();
        &self.state
    }

    pub fn current_user(&mut self) -> Option<&Session> {
        self.drain_events();
        self.state.session()
    }

    /// Resolve the stored token into a session.
    ///
    /// Expired or undecodable tokens are cleared without contacting the
    /// backend. A valid-looking token is confirmed by fetching the profile.
    pub async fn initialize(&mut self) -> Result<&SessionState, SessionError> {
        self.drain_events();
        self.state = SessionState::Checking;

        let Some(access) = self.tokens.access_token()? else {
            debug!("no stored access token");
            self.state = SessionState::Anonymous;
            return Ok(&self.state);
        };

        if jwt::is_expired(&access, Utc::now()) {
            info!("stored access token expired; logging out");
            self.tokens.clear()?;
            self.state = SessionState::Anonymous;
            return Ok(&self.state);
        }

        match self.auth.profile().await {
            Ok(user) => {
                debug!(username = %user.username, "restored session");
                self.state = SessionState::Authenticated(Session::from_user(user));
            }
            Err(e) => {
                warn!(error = %e, "could not load profile for stored token");
                self.tokens.clear()?;
                self.state = SessionState::Anonymous;
            }
        }
        // A refresh during the profile fetch may have failed.
        self.drain_events();
        Ok(&self.state)
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Result<&Session, SessionError> {
        self.drain_events();
        let response = self.auth.login(username, password).await?;
        self.tokens
            .set(&TokenPair::new(response.access, response.refresh))?;
        info!(username = %response.user.username, "logged in");
        self.authenticate(response.user)
    }

    pub async fn register(&mut self, request: &RegisterRequest) -> Result<&Session, SessionError> {
        self.drain_events();
        let response = self.auth.register(request).await?;
        self.tokens
            .set(&TokenPair::new(response.access, response.refresh))?;
        info!(username = %response.user.username, "registered");
        self.authenticate(response.user)
    }

    pub fn logout(&mut self) -> Result<(), SessionError> {
        self.drain_events();
        self.tokens.clear()?;
        if let SessionState::Authenticated(session) = &self.state {
            info!(username = %session.username, "logged out");
        }
        self.state = SessionState::Anonymous;
        Ok(())
    }

    pub async fn update_profile(&mut self, update: &ProfileUpdate) -> Result<&Session, SessionError> {
        self.drain_events();
        if !self.state.is_authenticated() {
            return Err(SessionError::NotAuthenticated);
        }
        let user = self.auth.update_profile(update).await?;
        self.authenticate(user)
    }

    /// End the context. Stored tokens stay on disk for the next run.
    pub fn close(self) {
        debug!("closing session context");
    }

    fn authenticate(&mut self, user: User) -> Result<&Session, SessionError> {
        self.state = SessionState::Authenticated(Session::from_user(user));
        self.state.session().ok_or(SessionError::NotAuthenticated)
    }

    fn drain_events(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(AuthEvent::SessionExpired) | Err(TryRecvError::Lagged(_)) => {
                    if self.state.is_authenticated() {
                        info!("session expired; please log in again");
                    }
                    self.state = SessionState::Anonymous;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
    }
}

#[cfg(test)]
mod tests;
