//! GraphQL API layer for the task service.
//!
//! A lightweight, self-contained executor: documents are parsed into an
//! AST, validated and coerced against the programmatic schema, and
//! resolved against the task store. The HTTP layer hands the request
//! envelope straight to [`GraphQLEngine::execute`] and writes the
//! response envelope back out, so every failure is expressed inside the
//! envelope rather than as an HTTP status.
//!
//! ```text
//! POST body → Parser → Validation/Coercion → Resolvers → Projection → Response
//! ```

pub mod ast;
pub mod parser;
pub mod resolver;
pub mod schema;

pub use resolver::GraphQLEngine;
pub use schema::{FieldType, GraphQLSchema, InputValue, SchemaField, SchemaType, task_schema};

use todo_graph::wire::{ErrorLocation, GraphQLError, GraphQLResponse};

use crate::task::TaskStoreError;
use ast::Pos;

/// Errors from the GraphQL layer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The document could not be lexed or parsed.
    #[error("Syntax Error: {message}")]
    Syntax {
        message: String,
        line: usize,
        column: usize,
    },

    /// The document or its input values failed schema validation.
    #[error("{message}")]
    Validation {
        message: String,
        location: Option<Pos>,
    },

    /// A resolver failed against the underlying store.
    #[error(transparent)]
    Store(#[from] TaskStoreError),

    /// A resolved value could not be serialized into the response.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Error::Validation {
            message: message.into(),
            location: None,
        }
    }

    pub(crate) fn validation_at(message: impl Into<String>, location: Pos) -> Self {
        Error::Validation {
            message: message.into(),
            location: Some(location),
        }
    }

    /// Whether execution had already started when this error surfaced.
    fn reached_execution(&self) -> bool {
        matches!(self, Error::Store(_) | Error::Serialize(_))
    }

    /// Converts the error into a complete response envelope.
    ///
    /// Requests rejected before execution carry no `data` key at all;
    /// failures during execution keep an explicit `data: null`.
    pub fn into_response(self) -> GraphQLResponse {
        let data = self.reached_execution().then_some(serde_json::Value::Null);
        GraphQLResponse {
            data,
            errors: vec![GraphQLError::from(self)],
        }
    }
}

impl From<Error> for GraphQLError {
    fn from(error: Error) -> Self {
        let locations = match &error {
            Error::Syntax { line, column, .. } => vec![ErrorLocation {
                line: *line,
                column: *column,
            }],
            Error::Validation { location, .. } => location
                .map(|pos| ErrorLocation {
                    line: pos.line,
                    column: pos.column,
                })
                .into_iter()
                .collect(),
            Error::Store(_) | Error::Serialize(_) => Vec::new(),
        };
        GraphQLError {
            message: error.to_string(),
            locations,
            path: Vec::new(),
        }
    }
}
