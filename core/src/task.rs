//! Task records and the input payloads that mutate them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tracked task.
///
/// Serialized field names match the GraphQL schema, so a serialized task
/// is exactly the object a `Task` selection resolves against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Completion state of a task. New tasks always start out [`Pending`].
///
/// [`Pending`]: TaskStatus::Pending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
}

impl TaskStatus {
    /// The opposite status; toggling a task always requests this.
    pub fn toggled(self) -> TaskStatus {
        match self {
            TaskStatus::Pending => TaskStatus::Completed,
            TaskStatus::Completed => TaskStatus::Pending,
        }
    }
}

/// Payload of the `createTask` mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTaskInput {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Payload of the `updateTaskStatus` mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTaskStatusInput {
    pub id: i32,
    pub status: TaskStatus,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn sample_task() -> Task {
        Task {
            id: 7,
            title: "Buy milk".to_string(),
            description: "Two liters".to_string(),
            status: TaskStatus::Pending,
            created_at: Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
        }
    }

    #[test]
    fn serializes_with_graphql_field_names() {
        let value = serde_json::to_value(sample_task()).expect("Failed to serialize task");

        assert_eq!(value["id"], json!(7));
        assert_eq!(value["title"], json!("Buy milk"));
        assert_eq!(value["status"], json!("PENDING"));
        assert_eq!(value["createdAt"], json!("2026-01-02T03:04:05Z"));
        assert_eq!(value["updatedAt"], json!("2026-01-02T03:04:05Z"));
    }

    #[test]
    fn deserializes_from_graphql_payload() {
        let payload = json!({
            "id": 7,
            "title": "Buy milk",
            "description": "Two liters",
            "status": "PENDING",
            "createdAt": "2026-01-02T03:04:05Z",
            "updatedAt": "2026-01-02T03:04:05Z",
        });

        let task: Task = serde_json::from_value(payload).expect("Failed to deserialize task");

        assert_eq!(task, sample_task());
    }

    #[test]
    fn status_round_trips_in_screaming_snake_case() {
        assert_eq!(
            serde_json::to_value(TaskStatus::Completed).unwrap(),
            json!("COMPLETED")
        );
        let status: TaskStatus = serde_json::from_value(json!("COMPLETED")).unwrap();
        assert_eq!(status, TaskStatus::Completed);
    }

    #[test]
    fn toggled_flips_between_the_two_statuses() {
        assert_eq!(TaskStatus::Pending.toggled(), TaskStatus::Completed);
        assert_eq!(TaskStatus::Completed.toggled(), TaskStatus::Pending);
    }

    #[test]
    fn create_input_omits_missing_description() {
        let input = CreateTaskInput {
            title: "Buy milk".to_string(),
            description: None,
        };

        let value = serde_json::to_value(input).unwrap();

        assert_eq!(value, json!({ "title": "Buy milk" }));
    }
}
