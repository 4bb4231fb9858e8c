use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, EntityTrait, QueryOrder};
use todo_graph::{Task, TaskStatus};

use crate::entities::{sea_orm_active_enums, task};

/// Error type for task store operations.
#[derive(Debug, thiserror::Error)]
pub enum TaskStoreError {
    /// Represents a database error.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

/// A task about to be inserted. The store assigns the id and both
/// timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
}

/// Storage interface for task records.
///
/// The GraphQL resolvers talk to this trait only, so resolver tests can
/// substitute a mock and the HTTP layer stays storage-agnostic.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Inserts a new task and returns the stored record.
    ///
    /// # Arguments
    ///
    /// * `new_task` - The title, description and initial status to store.
    ///
    /// # Returns
    ///
    /// A `Result` containing the created `Task` if successful, or an error otherwise.
    async fn insert(&self, new_task: NewTask) -> Result<Task, TaskStoreError>;

    /// Retrieves a task by its id.
    ///
    /// # Arguments
    ///
    /// * `id` - The id of the task to retrieve.
    ///
    /// # Returns
    ///
    /// A `Result` containing `Some(Task)` if the id exists, `None` otherwise, or an error.
    async fn find_by_id(&self, id: i32) -> Result<Option<Task>, TaskStoreError>;

    /// Retrieves all tasks in ascending id order.
    ///
    /// # Returns
    ///
    /// A `Result` containing a vector of `Task` if successful, or an error otherwise.
    async fn list_all(&self) -> Result<Vec<Task>, TaskStoreError>;

    /// Sets the status of a task and refreshes its update timestamp.
    ///
    /// # Arguments
    ///
    /// * `id` - The id of the task to update.
    /// * `status` - The status to store.
    ///
    /// # Returns
    ///
    /// A `Result` containing the updated `Task`, `None` if the id is unknown, or an error.
    async fn update_status(
        &self,
        id: i32,
        status: TaskStatus,
    ) -> Result<Option<Task>, TaskStoreError>;

    /// Deletes a task by its id.
    ///
    /// # Arguments
    ///
    /// * `id` - The id of the task to delete.
    ///
    /// # Returns
    ///
    /// A `Result` containing `true` if a row was deleted, `false` if the id is unknown, or an error.
    async fn delete(&self, id: i32) -> Result<bool, TaskStoreError>;
}

/// `SeaORM`-backed task store.
pub struct SeaOrmTaskStore {
    db: DatabaseConnection,
}

impl SeaOrmTaskStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TaskStore for SeaOrmTaskStore {
    #[tracing::instrument(skip(self))]
    async fn insert(&self, new_task: NewTask) -> Result<Task, TaskStoreError> {
        let now = Utc::now();
        let active_model = task::ActiveModel {
            title: ActiveValue::Set(new_task.title),
            description: ActiveValue::Set(new_task.description),
            status: ActiveValue::Set(new_task.status.into()),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        };
        let created_model = active_model.insert(&self.db).await?;
        Ok(Task::from(created_model))
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_id(&self, id: i32) -> Result<Option<Task>, TaskStoreError> {
        let task_model = task::Entity::find_by_id(id).one(&self.db).await?;
        Ok(task_model.map(Task::from))
    }

    #[tracing::instrument(skip(self))]
    async fn list_all(&self) -> Result<Vec<Task>, TaskStoreError> {
        let tasks = task::Entity::find()
            .order_by_asc(task::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Task::from)
            .collect();
        Ok(tasks)
    }

    #[tracing::instrument(skip(self))]
    async fn update_status(
        &self,
        id: i32,
        status: TaskStatus,
    ) -> Result<Option<Task>, TaskStoreError> {
        let Some(task_to_update) = task::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let mut active_model: task::ActiveModel = task_to_update.into();
        active_model.status = ActiveValue::Set(status.into());
        active_model.updated_at = ActiveValue::Set(Utc::now());
        let updated_model = active_model.update(&self.db).await?;

        Ok(Some(Task::from(updated_model)))
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: i32) -> Result<bool, TaskStoreError> {
        let delete_result = task::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(delete_result.rows_affected > 0)
    }
}

impl From<task::Model> for Task {
    fn from(model: task::Model) -> Self {
        Task {
            id: model.id,
            title: model.title,
            description: model.description,
            status: model.status.into(),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<sea_orm_active_enums::TaskStatus> for TaskStatus {
    fn from(status: sea_orm_active_enums::TaskStatus) -> Self {
        match status {
            sea_orm_active_enums::TaskStatus::Pending => TaskStatus::Pending,
            sea_orm_active_enums::TaskStatus::Completed => TaskStatus::Completed,
        }
    }
}

impl From<TaskStatus> for sea_orm_active_enums::TaskStatus {
    fn from(status: TaskStatus) -> Self {
        match status {
            TaskStatus::Pending => sea_orm_active_enums::TaskStatus::Pending,
            TaskStatus::Completed => sea_orm_active_enums::TaskStatus::Completed,
        }
    }
}
