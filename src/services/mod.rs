//! Typed facades, one method per backend endpoint
//!
//! Facades validate nothing themselves and never retry; errors from the
//! client propagate unchanged.

mod auth;
mod challenges;
mod progress;

pub use auth::AuthService;
pub use challenges::{ChallengeQuery, ChallengeService};
pub use progress::ProgressService;

use crate::api::ApiClient;

/// All facades over one shared client.
#[derive(Clone)]
pub struct Services {
    pub auth: AuthService,
    pub challenges: ChallengeService,
    pub progress: ProgressService,
}

impl Services {
    pub fn new(client: ApiClient) -> Self {
        Self {
            auth: AuthService::new(client.clone()),
            challenges: ChallengeService::new(client.clone()),
            progress: ProgressService::new(client),
        }
    }
}
