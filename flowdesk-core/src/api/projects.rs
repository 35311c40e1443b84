use super::ApiClient;
use crate::error::ApiError;
use crate::models::{CreateProjectRequest, Project, Task};

impl ApiClient {
    pub async fn projects(&self) -> Result<Vec<Project>, ApiError> {
        self.get("/projects").await
    }

    pub async fn project(&self, id: &str) -> Result<Project, ApiError> {
        self.get(&format!("/projects/{id}")).await
    }

    pub async fn project_tasks(&self, id: &str) -> Result<Vec<Task>, ApiError> {
        self.get(&format!("/projects/{id}/tasks")).await
    }

    pub async fn create_project(&self, request: &CreateProjectRequest) -> Result<Project, ApiError> {
        self.post("/projects", request).await
    }
}
