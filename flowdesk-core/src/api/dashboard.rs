use super::ApiClient;
use crate::error::ApiError;
use crate::models::{DeveloperDashboard, ManagerDashboard};

impl ApiClient {
    pub async fn developer_dashboard(&self) -> Result<DeveloperDashboard, ApiError> {
        self.get("/dashboard/developer").await
    }

    pub async fn manager_dashboard(&self) -> Result<ManagerDashboard, ApiError> {
        self.get("/dashboard/manager").await
    }
}
