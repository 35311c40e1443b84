use super::ApiClient;
use crate::error::ApiError;
use crate::models::{
    ApproveTaskRequest, AssignTaskRequest, AssigneeRecommendation, Comment, CreateCommentRequest,
    CreateSubtaskRequest, CreateTaskRequest, SubmitForReviewRequest, Subtask, Task, TaskStatus,
    UpdateStatusRequest,
};

impl ApiClient {
    pub async fn task(&self, id: &str) -> Result<Task, ApiError> {
        self.get(&format!("/tasks/{id}")).await
    }

    pub async fn user_tasks(&self, user_id: &str) -> Result<Vec<Task>, ApiError> {
        self.get(&format!("/tasks/users/{user_id}/tasks")).await
    }

    pub async fn create_task(&self, request: &CreateTaskRequest) -> Result<Task, ApiError> {
        self.post("/tasks", request).await
    }

    pub async fn assign_task(&self, task_id: &str, user_id: &str) -> Result<Task, ApiError> {
        let body = AssignTaskRequest {
            user_id: user_id.to_string(),
        };
        self.post(&format!("/tasks/{task_id}/assign"), &body).await
    }

    pub async fn update_task_status(&self, task_id: &str, status: TaskStatus) -> Result<Task, ApiError> {
        self.patch(&format!("/tasks/{task_id}/status"), &UpdateStatusRequest { status })
            .await
    }

    pub async fn submit_for_review(
        &self,
        task_id: &str,
        request: &SubmitForReviewRequest,
    ) -> Result<Task, ApiError> {
        self.post(&format!("/tasks/{task_id}/submit-for-review"), request)
            .await
    }

    pub async fn approve_task(&self, task_id: &str, comment: &str) -> Result<Task, ApiError> {
        let body = ApproveTaskRequest {
            comment: comment.to_string(),
        };
        self.post(&format!("/tasks/{task_id}/approve"), &body).await
    }

    /// The backend answers with an empty list when its ranking service is down.
    pub async fn recommend_assignees(&self, task_id: &str) -> Result<Vec<AssigneeRecommendation>, ApiError> {
        self.post(&format!("/tasks/{task_id}/recommend-assignees"), &serde_json::json!({}))
            .await
    }

    pub async fn subtasks(&self, task_id: &str) -> Result<Vec<Subtask>, ApiError> {
        self.get(&format!("/subtasks/tasks/{task_id}/subtasks")).await
    }

    pub async fn create_subtask(&self, task_id: &str, title: &str) -> Result<Subtask, ApiError> {
        let body = CreateSubtaskRequest {
            task_id: task_id.to_string(),
            title: title.trim().to_string(),
        };
        self.post("/subtasks", &body).await
    }

    pub async fn toggle_subtask(&self, id: &str) -> Result<Subtask, ApiError> {
        self.patch_empty(&format!("/subtasks/{id}/toggle")).await
    }

    pub async fn delete_subtask(&self, id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/subtasks/{id}")).await
    }

    pub async fn comments(&self, task_id: &str) -> Result<Vec<Comment>, ApiError> {
        self.get(&format!("/comments/tasks/{task_id}/comments")).await
    }

    pub async fn create_comment(&self, task_id: &str, content: &str) -> Result<Comment, ApiError> {
        let body = CreateCommentRequest {
            task_id: task_id.to_string(),
            content: content.to_string(),
        };
        self.post("/comments", &body).await
    }
}

#[cfg(test)]
mod tests {
    use crate::api::tests::{harness, signed_in};
    use crate::models::{Role, TaskStatus};
    use reqwest::Method;
    use serde_json::json;

    fn task_json(id: &str, status: &str) -> serde_json::Value {
        json!({"id": id, "title": "Wire login", "status": status, "priority": "HIGH"})
    }

    #[tokio::test]
    async fn status_change_is_a_patch_with_screaming_status() {
        let h = harness();
        signed_in(&h, Role::Developer);
        h.transport.reply(200, task_json("t-1", "IN_REVIEW"));

        let task = h
            .api
            .update_task_status("t-1", TaskStatus::InReview)
            .await
            .expect("status");
        assert_eq!(task.status, TaskStatus::InReview);

        let (url, req) = &h.transport.sent()[0];
        assert_eq!(url, "http://backend.test/api/tasks/t-1/status");
        assert_eq!(req.method, Method::PATCH);
        assert_eq!(req.body, Some(json!({"status": "IN_REVIEW"})));
    }

    #[tokio::test]
    async fn assign_posts_user_id() {
        let h = harness();
        signed_in(&h, Role::Manager);
        h.transport.reply(200, task_json("t-2", "TODO"));

        h.api.assign_task("t-2", "u-9").await.expect("assign");

        let (url, req) = &h.transport.sent()[0];
        assert!(url.ends_with("/tasks/t-2/assign"));
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.body, Some(json!({"userId": "u-9"})));
    }

    #[tokio::test]
    async fn subtask_title_is_trimmed_and_delete_ignores_body() {
        let h = harness();
        signed_in(&h, Role::Developer);
        h.transport
            .reply(200, json!({"id": "s-1", "title": "Write tests", "isCompleted": false}));
        h.transport.reply_raw(204, "");

        let sub = h.api.create_subtask("t-1", "  Write tests ").await.expect("create");
        assert!(!sub.completed);
        h.api.delete_subtask("s-1").await.expect("delete");

        let sent = h.transport.sent();
        assert_eq!(sent[0].1.body, Some(json!({"taskId": "t-1", "title": "Write tests"})));
        assert_eq!(sent[1].1.method, Method::DELETE);
        assert!(sent[1].0.ends_with("/subtasks/s-1"));
    }
}
