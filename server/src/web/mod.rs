use std::sync::Arc;

use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use migration::MigratorTrait;
use sea_orm::Database;
use todo_graph::{GraphQLRequest, GraphQLResponse};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config;
use crate::graphql::GraphQLEngine;
use crate::task::SeaOrmTaskStore;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<GraphQLEngine>,
}

#[tracing::instrument(skip(config))]
pub async fn start_web_server(config: config::Config) -> anyhow::Result<()> {
    let server_address = format!("0.0.0.0:{}", &config.port);
    let listener = tokio::net::TcpListener::bind(&server_address).await?;
    tracing::info!("GraphQL server running on http://{}", server_address);

    let db = Database::connect(&config.database_url).await?;
    migration::Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied successfully");

    let store = SeaOrmTaskStore::new(db);
    let state = AppState {
        engine: Arc::new(GraphQLEngine::new(Arc::new(store))),
    };
    let app = create_graphql_router(state);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Builds the application router: the GraphQL endpoint, an SDL view of the
/// schema on the same path, and a health probe.
pub fn create_graphql_router(state: AppState) -> Router {
    Router::new()
        .route("/graphql", post(graphql_handler).get(sdl_handler))
        .route("/health", get(health_check_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Single GraphQL entry point. Well-formed requests always come back as
/// `200 OK`; failures live in the envelope's `errors` list.
#[tracing::instrument(skip(state, request))]
pub async fn graphql_handler(
    State(state): State<AppState>,
    Json(request): Json<GraphQLRequest>,
) -> Json<GraphQLResponse> {
    Json(state.engine.execute(request).await)
}

/// Serves the schema in SDL form for `GET /graphql?sdl`.
#[tracing::instrument(skip(state))]
pub async fn sdl_handler(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<String, (StatusCode, &'static str)> {
    match query.as_deref() {
        Some("sdl") => Ok(state.engine.schema().to_string()),
        _ => Err((StatusCode::BAD_REQUEST, "expected the query string \"sdl\"")),
    }
}

#[tracing::instrument]
pub async fn health_check_handler() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use tower::ServiceExt;

    use super::*;
    use crate::task::MockTaskStore;

    fn test_router() -> Router {
        let state = AppState {
            engine: Arc::new(GraphQLEngine::new(Arc::new(MockTaskStore::new()))),
        };
        create_graphql_router(state)
    }

    #[tokio::test]
    async fn can_answer_health_checks() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = test_router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(std::str::from_utf8(&body).unwrap(), "OK");
    }

    #[tokio::test]
    async fn rejects_malformed_request_bodies() {
        let request = Request::builder()
            .method("POST")
            .uri("/graphql")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{ not json"))
            .unwrap();
        let response = test_router().oneshot(request).await.unwrap();

        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn serves_the_schema_as_sdl() {
        let request = Request::builder()
            .uri("/graphql?sdl")
            .body(Body::empty())
            .unwrap();
        let response = test_router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let sdl = std::str::from_utf8(&body).unwrap();
        assert!(sdl.contains("type Task {"));
        assert!(sdl.contains("type Mutation {"));
    }

    #[tokio::test]
    async fn requires_the_sdl_query_string_on_get() {
        let request = Request::builder().uri("/graphql").body(Body::empty()).unwrap();
        let response = test_router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn allows_cross_origin_callers() {
        let request = Request::builder()
            .method("POST")
            .uri("/graphql")
            .header(header::ORIGIN, "http://localhost:8080")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"query": "{ __typename }"}"#))
            .unwrap();
        let response = test_router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cors_header = header::ACCESS_CONTROL_ALLOW_ORIGIN;
        assert!(response.headers().contains_key(cors_header));
    }
}
