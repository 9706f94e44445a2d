//! Wiring shared by every command

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tracing::debug;

use createathon::api::{ApiClient, UreqTransport};
use createathon::config::Config;
use createathon::services::Services;
use createathon::session::{Session, SessionContext};
use createathon::storage::{FileStore, KeyValueStore, LocalState, TokenStore};
use createathon::ApiError;

/// Everything a command needs, built once per invocation.
pub struct App {
    pub services: Services,
    pub session: SessionContext,
    pub local: LocalState,
    pub json: bool,
}

impl App {
    pub fn new(config: &Config, api_url: Option<&str>, json: bool) -> Self {
        let base_url = config.base_url(api_url);
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::in_dir(&config.data_dir()));
        debug!(%base_url, data_dir = %config.data_dir().display(), "starting client");

        let transport = UreqTransport::new(config.connect_timeout(), config.read_timeout());
        let client = ApiClient::new(
            &base_url,
            transport.into_shared(),
            TokenStore::new(Arc::clone(&store)),
        );

        Self {
            session: SessionContext::for_client(&client),
            services: Services::new(client),
            local: LocalState::new(store),
            json,
        }
    }

    /// Resolve the stored token into a session.
    pub async fn start(&mut self) -> Result<()> {
        self.session
            .initialize()
            .await
            .context("Failed to restore session")?;
        Ok(())
    }

    /// The logged-in user, or an error telling the user to log in.
    pub fn require_user(&mut self) -> Result<Session> {
        self.session
            .current_user()
            .cloned()
            .ok_or_else(|| anyhow!("Not logged in. Run `createathon login` first."))
    }

    pub fn close(self) {
        self.session.close();
    }
}

/// Map a backend failure to the inline alert text shown to the user.
pub fn alert(fallback: &'static str) -> impl FnOnce(ApiError) -> anyhow::Error {
    move |err| {
        debug!(error = %err, "request failed");
        anyhow!(err.user_message(fallback))
    }
}

pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
