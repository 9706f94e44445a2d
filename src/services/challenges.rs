use serde_json::json;

use crate::api::{ApiClient, ApiRequest};
use crate::error::ApiError;
use crate::models::{Category, Challenge, ChallengeId, Difficulty, Page, Submission};

/// Server-side filters for `GET /challenges/`. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChallengeQuery {
    pub difficulty: Option<Difficulty>,
    pub category: Option<u64>,
    pub search: Option<String>,
    /// e.g. `points`, `-created_at`
    pub ordering: Option<String>,
    pub limit: Option<u32>,
    pub page: Option<u32>,
}

impl ChallengeQuery {
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(difficulty) = self.difficulty {
            params.push(("difficulty".to_string(), difficulty.to_string()));
        }
        if let Some(category) = self.category {
            params.push(("category".to_string(), category.to_string()));
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            params.push(("search".to_string(), search.to_string()));
        }
        if let Some(ordering) = &self.ordering {
            params.push(("ordering".to_string(), ordering.clone()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(page) = self.page {
            params.push(("page".to_string(), page.to_string()));
        }
        params
    }
}

/// `/challenges/*` endpoints.
#[derive(Clone)]
pub struct ChallengeService {
    client: ApiClient,
}

impl ChallengeService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &ChallengeQuery) -> Result<Page<Challenge>, ApiError> {
        let request = ApiRequest::get("/challenges/").query(query.to_params());
        self.client.execute(request).await
    }

    pub async fn get(&self, id: ChallengeId) -> Result<Challenge, ApiError> {
        self.client.get(&format!("/challenges/{id}/")).await
    }

    pub async fn categories(&self) -> Result<Page<Category>, ApiError> {
        self.client.get("/challenges/categories/").await
    }

    pub async fn submit(&self, id: ChallengeId, content: &str) -> Result<Submission, ApiError> {
        let request =
            ApiRequest::post(format!("/challenges/{id}/submit/")).json(&json!({ "content": content }))?;
        self.client.execute(request).await
    }

    /// The current user's submissions, newest first.
    pub async fn submissions(&self) -> Result<Page<Submission>, ApiError> {
        self.client.get("/challenges/submissions/").await
    }
}
