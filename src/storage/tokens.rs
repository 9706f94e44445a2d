//! Access/refresh token persistence

use std::sync::Arc;

use super::{KeyValueStore, StorageError};

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Credentials issued by the backend on login, register and refresh.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}

/// Token storage over a [`KeyValueStore`]. No expiry logic lives here.
#[derive(Clone)]
pub struct TokenStore {
    store: Arc<dyn KeyValueStore>,
}

impl TokenStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Both tokens, or `None` unless both are present.
    pub fn get(&self) -> Result<Option<TokenPair>, StorageError> {
        let mut entries = self.store.snapshot()?;
        let access = entries.remove(ACCESS_TOKEN_KEY);
        let refresh = entries.remove(REFRESH_TOKEN_KEY);
        Ok(match (access, refresh) {
            (Some(access_token), Some(refresh_token)) => Some(TokenPair {
                access_token,
                refresh_token,
            }),
            _ => None,
        })
    }

    /// Replace both tokens in one write.
    pub fn set(&self, pair: &TokenPair) -> Result<(), StorageError> {
        self.store.update(&mut |entries| {
            entries.insert(ACCESS_TOKEN_KEY.to_string(), pair.access_token.clone());
            entries.insert(REFRESH_TOKEN_KEY.to_string(), pair.refresh_token.clone());
        })
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.update(&mut |entries| {
            entries.remove(ACCESS_TOKEN_KEY);
            entries.remove(REFRESH_TOKEN_KEY);
        })
    }

    pub fn access_token(&self) -> Result<Option<String>, StorageError> {
        self.store.get(ACCESS_TOKEN_KEY)
    }

    pub fn refresh_token(&self) -> Result<Option<String>, StorageError> {
        self.store.get(REFRESH_TOKEN_KEY)
    }

    /// Store a freshly minted access token, leaving the refresh token alone.
    pub fn set_access_token(&self, access_token: &str) -> Result<(), StorageError> {
        self.store.set(ACCESS_TOKEN_KEY, access_token)
    }
}
