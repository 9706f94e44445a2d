use crate::api::{ApiClient, ApiRequest};
use crate::error::ApiError;
use crate::models::{AuthResponse, LoginRequest, ProfileUpdate, RegisterRequest, User};

/// `/users/*` endpoints.
///
/// Login and register only return the token pair; storing it is the
/// session's job.
#[derive(Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let request = ApiRequest::post("/users/login/")
            .json(&LoginRequest { username, password })?
            .without_refresh();
        self.client.execute(request).await
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        let request = ApiRequest::post("/users/register/")
            .json(request)?
            .without_refresh();
        self.client.execute(request).await
    }

    pub async fn profile(&self) -> Result<User, ApiError> {
        self.client.get("/users/profile/").await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        let request = ApiRequest::put("/users/profile/").json(update)?;
        self.client.execute(request).await
    }
}
