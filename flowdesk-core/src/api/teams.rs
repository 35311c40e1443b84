use super::ApiClient;
use crate::error::ApiError;
use crate::models::{AddMemberRequest, CreateTeamRequest, Team, TeamWorkload};

impl ApiClient {
    pub async fn teams(&self) -> Result<Vec<Team>, ApiError> {
        self.get("/teams").await
    }

    pub async fn team(&self, id: &str) -> Result<Team, ApiError> {
        self.get(&format!("/teams/{id}")).await
    }

    pub async fn team_workload(&self, id: &str) -> Result<TeamWorkload, ApiError> {
        self.get(&format!("/teams/{id}/workload")).await
    }

    pub async fn create_team(&self, request: &CreateTeamRequest) -> Result<Team, ApiError> {
        self.post("/teams", request).await
    }

    pub async fn add_team_member(&self, team_id: &str, user_id: &str) -> Result<Team, ApiError> {
        let body = AddMemberRequest {
            user_id: user_id.to_string(),
        };
        self.post(&format!("/teams/{team_id}/members"), &body).await
    }
}
