//! HTTP client for the task tracker's GraphQL API.
//!
//! One endpoint behind typed methods: each sends a prepared query document
//! with JSON variables, then narrows the response envelope down to the
//! single field that document asks for. Works natively and on wasm, so the
//! web UI and integration tests share it.

use serde::de::DeserializeOwned;
use serde_json::json;
use todo_graph::{
    CreateTaskInput, GraphQLError, GraphQLRequest, GraphQLResponse, Task, TaskStatus,
};

pub const GET_ALL_TASKS_QUERY: &str = "\
query GetAllTasks {
  getAllTasks {
    id
    title
    description
    status
    createdAt
    updatedAt
  }
}";

pub const GET_TASK_BY_ID_QUERY: &str = "\
query GetTaskById($id: Int!) {
  getTaskById(id: $id) {
    id
    title
    description
    status
    createdAt
    updatedAt
  }
}";

pub const CREATE_TASK_MUTATION: &str = "\
mutation CreateTask($input: CreateTaskInput!) {
  createTask(input: $input) {
    id
    title
    description
    status
    createdAt
    updatedAt
  }
}";

pub const UPDATE_TASK_STATUS_MUTATION: &str = "\
mutation UpdateTaskStatus($input: UpdateTaskStatusInput!) {
  updateTaskStatus(input: $input) {
    id
    title
    description
    status
    createdAt
    updatedAt
  }
}";

pub const DELETE_TASK_MUTATION: &str = "\
mutation DeleteTask($id: Int!) {
  deleteTask(id: $id)
}";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request never produced a usable HTTP response.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    /// The server answered outside the 2xx range.
    #[error("HTTP error! status: {0}")]
    Status(reqwest::StatusCode),
    /// The envelope carried GraphQL errors.
    #[error("GraphQL error: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),
    #[error("Malformed response payload: {0}")]
    Decode(#[from] serde_json::Error),
    /// A 2xx answer whose envelope carried neither data nor errors.
    #[error("response contained no data")]
    MissingData,
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    errors
        .iter()
        .map(|error| error.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Typed client bound to one GraphQL endpoint.
#[derive(Debug, Clone)]
pub struct TaskClient {
    http: reqwest::Client,
    endpoint: String,
}

impl TaskClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub async fn get_all_tasks(&self) -> Result<Vec<Task>, ClientError> {
        self.request(GET_ALL_TASKS_QUERY, serde_json::Value::Null, "getAllTasks")
            .await
    }

    pub async fn get_task_by_id(&self, id: i32) -> Result<Option<Task>, ClientError> {
        self.request(GET_TASK_BY_ID_QUERY, json!({ "id": id }), "getTaskById")
            .await
    }

    pub async fn create_task(&self, input: CreateTaskInput) -> Result<Task, ClientError> {
        self.request(CREATE_TASK_MUTATION, json!({ "input": input }), "createTask")
            .await
    }

    /// Sets a task's status. `None` means the id matched nothing.
    pub async fn update_task_status(
        &self,
        id: i32,
        status: TaskStatus,
    ) -> Result<Option<Task>, ClientError> {
        let variables = json!({ "input": { "id": id, "status": status } });
        self.request(UPDATE_TASK_STATUS_MUTATION, variables, "updateTaskStatus")
            .await
    }

    /// Returns whether a row actually went away.
    pub async fn delete_task(&self, id: i32) -> Result<bool, ClientError> {
        self.request(DELETE_TASK_MUTATION, json!({ "id": id }), "deleteTask")
            .await
    }

    async fn request<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
        field: &str,
    ) -> Result<T, ClientError> {
        let mut body = GraphQLRequest::new(query);
        body.variables = variables.as_object().cloned();

        let response = self.http.post(&self.endpoint).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(ClientError::Status(response.status()));
        }
        let envelope = response.json::<GraphQLResponse>().await?;
        narrow_data(envelope, field)
    }
}

/// Pulls one field's value out of a response envelope.
fn narrow_data<T: DeserializeOwned>(
    envelope: GraphQLResponse,
    field: &str,
) -> Result<T, ClientError> {
    if !envelope.errors.is_empty() {
        return Err(ClientError::GraphQL(envelope.errors));
    }
    let Some(data) = envelope.data else {
        return Err(ClientError::MissingData);
    };
    let value = data.get(field).cloned().unwrap_or(serde_json::Value::Null);
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrows_to_the_requested_field() {
        let envelope = GraphQLResponse::from_data(json!({"deleteTask": true}));

        let deleted: bool = narrow_data(envelope, "deleteTask").unwrap();

        assert!(deleted);
    }

    #[test]
    fn missing_tasks_narrow_to_none() {
        let envelope = GraphQLResponse::from_data(json!({"getTaskById": null}));

        let task: Option<Task> = narrow_data(envelope, "getTaskById").unwrap();

        assert!(task.is_none());
    }

    #[test]
    fn parses_a_complete_task_payload() {
        let envelope = GraphQLResponse::from_data(json!({
            "createTask": {
                "id": 1,
                "title": "Buy milk",
                "description": "",
                "status": "PENDING",
                "createdAt": "2026-01-02T03:04:05Z",
                "updatedAt": "2026-01-02T03:04:05Z",
            }
        }));

        let task: Task = narrow_data(envelope, "createTask").unwrap();

        assert_eq!(task.id, 1);
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.status, TaskStatus::Pending);
    }

    #[test]
    fn graphql_errors_take_precedence_over_data() {
        let envelope = GraphQLResponse {
            data: Some(serde_json::Value::Null),
            errors: vec![
                GraphQLError::new("first failure"),
                GraphQLError::new("second failure"),
            ],
        };

        let error = narrow_data::<bool>(envelope, "deleteTask").unwrap_err();

        assert!(matches!(error, ClientError::GraphQL(_)));
        assert_eq!(
            error.to_string(),
            "GraphQL error: first failure; second failure"
        );
    }

    #[test]
    fn envelopes_without_data_are_rejected() {
        let envelope = GraphQLResponse {
            data: None,
            errors: Vec::new(),
        };

        let result = narrow_data::<bool>(envelope, "deleteTask");

        assert!(matches!(result, Err(ClientError::MissingData)));
    }

    #[test]
    fn documents_select_every_task_field() {
        let documents = [
            GET_ALL_TASKS_QUERY,
            GET_TASK_BY_ID_QUERY,
            CREATE_TASK_MUTATION,
            UPDATE_TASK_STATUS_MUTATION,
        ];
        let fields = ["id", "title", "description", "status", "createdAt", "updatedAt"];

        for document in documents {
            for field in fields {
                assert!(document.contains(field), "{document} misses {field}");
            }
        }
        assert!(DELETE_TASK_MUTATION.contains("deleteTask(id: $id)"));
    }
}
