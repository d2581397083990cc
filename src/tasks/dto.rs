use serde::{Deserialize, Serialize};

use crate::tasks::repo::Task;

/// Body for both task creation and task update.
#[derive(Debug, Deserialize)]
pub struct TaskPayload {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct TaskCreatedResponse {
    pub message: String,
    pub task: Task,
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub task: Task,
}

#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    pub tasks: Vec<Task>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use uuid::Uuid;

    #[test]
    fn task_serializes_with_camel_case_flags() {
        let task = Task {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Buy milk".into(),
            description: "2% low fat".into(),
            is_completed: false,
            is_deleted: false,
            created_at: datetime!(2024-01-01 12:00 UTC),
            last_update: datetime!(2024-01-01 12:00 UTC),
        };
        let json = serde_json::to_string(&TaskResponse { task }).expect("serialize");
        assert!(json.contains("isCompleted"));
        assert!(json.contains("isDeleted"));
        assert!(json.contains("createdAt"));
        assert!(json.contains("Buy milk"));
    }
}
