use std::net::SocketAddr;
use std::sync::Arc;

use sea_orm::DatabaseConnection;
use todo_graph::{CreateTaskInput, TaskStatus};
use todo_graph_client::{ClientError, TaskClient};
use todo_graph_server::graphql::GraphQLEngine;
use todo_graph_server::task::SeaOrmTaskStore;
use todo_graph_server::web::{AppState, create_graphql_router};

mod common;

/// Serves the real router on an ephemeral local port and returns a client
/// pointed at it.
async fn spawn_client(db: DatabaseConnection) -> anyhow::Result<TaskClient> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let address: SocketAddr = listener.local_addr()?;

    let store = SeaOrmTaskStore::new(db);
    let state = AppState {
        engine: Arc::new(GraphQLEngine::new(Arc::new(store))),
    };
    let app = create_graphql_router(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(TaskClient::new(format!("http://{address}/graphql")))
}

#[tokio::test]
async fn can_run_the_full_task_lifecycle_through_the_client() -> anyhow::Result<()> {
    let state = common::setup().await?;
    let client = spawn_client(state.db).await?;

    let created = client
        .create_task(CreateTaskInput {
            title: "Buy milk".to_string(),
            description: Some("2% if they have it".to_string()),
        })
        .await?;
    assert_eq!(created.title, "Buy milk");
    assert_eq!(created.description, "2% if they have it");
    assert_eq!(created.status, TaskStatus::Pending);
    assert_eq!(created.created_at, created.updated_at);

    let fetched = client.get_task_by_id(created.id).await?;
    assert_eq!(fetched.as_ref(), Some(&created));

    let updated = client
        .update_task_status(created.id, TaskStatus::Completed)
        .await?
        .ok_or_else(|| anyhow::anyhow!("updated task should exist"))?;
    assert_eq!(updated.status, TaskStatus::Completed);
    assert!(updated.updated_at > created.updated_at);

    let tasks = client.get_all_tasks().await?;
    assert_eq!(tasks, vec![updated]);

    assert!(client.delete_task(created.id).await?);
    assert_eq!(client.get_task_by_id(created.id).await?, None);
    assert!(!client.delete_task(created.id).await?);
    Ok(())
}

#[tokio::test]
async fn creates_tasks_without_descriptions() -> anyhow::Result<()> {
    let state = common::setup().await?;
    let client = spawn_client(state.db).await?;

    let created = client
        .create_task(CreateTaskInput {
            title: "Walk dog".to_string(),
            description: None,
        })
        .await?;

    assert_eq!(created.description, "");
    Ok(())
}

#[tokio::test]
async fn lists_nothing_on_a_fresh_database() -> anyhow::Result<()> {
    let state = common::setup().await?;
    let client = spawn_client(state.db).await?;

    let tasks = client.get_all_tasks().await?;

    assert!(tasks.is_empty());
    Ok(())
}

#[tokio::test]
async fn rejects_blank_titles_through_the_client() -> anyhow::Result<()> {
    let state = common::setup().await?;
    let client = spawn_client(state.db).await?;

    let error = client
        .create_task(CreateTaskInput {
            title: "   ".to_string(),
            description: None,
        })
        .await
        .expect_err("blank titles should be rejected");

    match error {
        ClientError::GraphQL(errors) => {
            assert!(errors[0].message.contains("must not be blank"));
        }
        other => panic!("unexpected error: {other}"),
    }

    assert!(client.get_all_tasks().await?.is_empty());
    Ok(())
}
