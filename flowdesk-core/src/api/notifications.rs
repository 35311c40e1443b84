use super::ApiClient;
use crate::error::ApiError;
use crate::models::{Notification, UnreadCount};

impl ApiClient {
    pub async fn notifications(&self) -> Result<Vec<Notification>, ApiError> {
        self.get("/notifications").await
    }

    pub async fn unread_count(&self) -> Result<u64, ApiError> {
        self.get::<UnreadCount>("/notifications/unread-count")
            .await
            .map(|c| c.count)
    }

    pub async fn mark_notification_read(&self, id: &str) -> Result<(), ApiError> {
        self.post_empty(&format!("/notifications/{id}/mark-read")).await
    }

    pub async fn mark_all_notifications_read(&self) -> Result<(), ApiError> {
        self.post_empty("/notifications/mark-all-read").await
    }
}
