use super::ApiClient;
use crate::error::ApiError;
use crate::models::{UpdateUserRequest, User};

impl ApiClient {
    pub async fn users(&self) -> Result<Vec<User>, ApiError> {
        self.get("/users").await
    }

    pub async fn update_user(&self, id: &str, request: &UpdateUserRequest) -> Result<User, ApiError> {
        self.put(&format!("/users/{id}"), request).await
    }
}
