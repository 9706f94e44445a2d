use crate::api::ApiClient;
use crate::error::ApiError;
use crate::models::{ChallengeId, LeaderboardEntry, Page, UserAchievement, UserProgress};

/// `/progress/*` endpoints.
#[derive(Clone)]
pub struct ProgressService {
    client: ApiClient,
}

impl ProgressService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Page<UserProgress>, ApiError> {
        self.client.get("/progress/").await
    }

    pub async fn for_challenge(&self, id: ChallengeId) -> Result<UserProgress, ApiError> {
        self.client.get(&format!("/progress/{id}/")).await
    }

    pub async fn leaderboard(&self) -> Result<Page<LeaderboardEntry>, ApiError> {
        self.client.get("/progress/leaderboard/").await
    }

    /// Achievements the current user has earned.
    pub async fn achievements(&self) -> Result<Page<UserAchievement>, ApiError> {
        self.client.get("/progress/achievements/").await
    }
}
