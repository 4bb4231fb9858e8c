//! Core domain model for the task tracker.
//!
//! Shared between the server, the gateway client and the web UI so all
//! three agree on the task shape and the GraphQL request/response
//! envelopes that travel over the wire.

pub mod task;
pub mod wire;

pub use task::{CreateTaskInput, Task, TaskStatus, UpdateTaskStatusInput};
pub use wire::{ErrorLocation, GraphQLError, GraphQLRequest, GraphQLResponse};
