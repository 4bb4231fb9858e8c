//! Planning and execution of parsed documents against a [`TaskStore`].
//!
//! Execution is two-phase. Planning resolves the operation, coerces
//! variables and arguments, and validates every root field and nested
//! selection. Only when the whole plan checks out do resolvers run, one
//! root field at a time in document order, so an invalid request never
//! touches the store. Resolved values are then projected through the
//! selection so the response carries exactly the requested fields under
//! their response keys.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value as Json;
use todo_graph::{
    CreateTaskInput, GraphQLRequest, GraphQLResponse, TaskStatus, UpdateTaskStatusInput,
};

use super::Error;
use super::ast::{Document, Field, Operation, OperationKind, Pos, TypeRef};
use super::parser::parse_document;
use super::schema::{FieldType, GraphQLSchema, SchemaField, SchemaType, task_schema};
use crate::task::{NewTask, TaskStore};

/// The GraphQL engine: one schema bound to one task store.
pub struct GraphQLEngine {
    schema: GraphQLSchema,
    store: Arc<dyn TaskStore>,
}

/// A validated root field, ready to execute.
enum FieldPlan<'a> {
    /// `__typename` answers from the schema without a resolver.
    TypeName { field: &'a Field },
    Resolve {
        field: &'a Field,
        definition: &'a SchemaField,
        arguments: serde_json::Map<String, Json>,
    },
}

impl GraphQLEngine {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self {
            schema: task_schema(),
            store,
        }
    }

    pub fn schema(&self) -> &GraphQLSchema {
        &self.schema
    }

    /// Runs one request end to end. Never fails: every error becomes part
    /// of the response envelope.
    pub async fn execute(&self, request: GraphQLRequest) -> GraphQLResponse {
        match self.try_execute(&request).await {
            Ok(data) => GraphQLResponse::from_data(data),
            Err(error) => error.into_response(),
        }
    }

    async fn try_execute(&self, request: &GraphQLRequest) -> Result<Json, Error> {
        let document = parse_document(&request.query)?;
        let operation = select_operation(&document, request.operation_name.as_deref())?;
        let root = self.schema.operation_root(operation.kind).ok_or_else(|| {
            Error::validation("the schema does not support subscription operations")
        })?;
        let variables = self.coerce_variables(operation, request.variables.as_ref())?;
        let plan = self.plan_selection(root, &operation.selection_set, &variables)?;

        let mut data = serde_json::Map::new();
        for step in &plan {
            match step {
                FieldPlan::TypeName { field } => {
                    data.insert(field.response_key().to_string(), Json::from(root.name()));
                }
                FieldPlan::Resolve {
                    field,
                    definition,
                    arguments,
                } => {
                    let value = self
                        .resolve_root_field(operation.kind, field, arguments)
                        .await?;
                    let projected =
                        self.project_field(&definition.ty, &value, &field.selection_set)?;
                    data.insert(field.response_key().to_string(), projected);
                }
            }
        }
        Ok(Json::Object(data))
    }

    fn coerce_variables(
        &self,
        operation: &Operation,
        provided: Option<&serde_json::Map<String, Json>>,
    ) -> Result<serde_json::Map<String, Json>, Error> {
        let empty = serde_json::Map::new();
        let provided = provided.unwrap_or(&empty);

        let mut variables = serde_json::Map::new();
        for definition in &operation.variable_definitions {
            let ty = self.resolve_type(&definition.ty, definition.pos)?;
            let what = format!("Variable \"${}\"", definition.name);
            if let Some(value) = provided.get(&definition.name) {
                let coerced = self.schema.coerce_json(&ty, value, &what)?;
                variables.insert(definition.name.clone(), coerced);
            } else if let Some(default) = &definition.default_value {
                let coerced = self.schema.coerce_literal(&ty, default, &variables, &what)?;
                variables.insert(definition.name.clone(), coerced);
            } else if ty.is_non_null() {
                return Err(Error::validation_at(
                    format!("{what} of required type {ty} was not provided"),
                    definition.pos,
                ));
            } else {
                variables.insert(definition.name.clone(), Json::Null);
            }
        }
        Ok(variables)
    }

    /// Maps a written type reference onto the schema's own type names.
    fn resolve_type(&self, ty: &TypeRef, pos: Pos) -> Result<FieldType, Error> {
        match ty {
            TypeRef::Named(name) => {
                let known = self
                    .schema
                    .type_named(name)
                    .ok_or_else(|| Error::validation_at(format!("Unknown type \"{name}\""), pos))?;
                Ok(FieldType::Named(known.name()))
            }
            TypeRef::List(inner) => Ok(FieldType::List(Box::new(self.resolve_type(inner, pos)?))),
            TypeRef::NonNull(inner) => {
                Ok(FieldType::NonNull(Box::new(self.resolve_type(inner, pos)?)))
            }
        }
    }

    fn plan_selection<'a>(
        &'a self,
        root: &'a SchemaType,
        selection: &'a [Field],
        variables: &serde_json::Map<String, Json>,
    ) -> Result<Vec<FieldPlan<'a>>, Error> {
        let mut plan = Vec::with_capacity(selection.len());
        for field in selection {
            if field.name == "__typename" {
                check_typename_shape(field)?;
                plan.push(FieldPlan::TypeName { field });
                continue;
            }
            reject_introspection(field)?;
            let Some(definition) = root.field(&field.name) else {
                return Err(unknown_field(field, root));
            };
            let arguments = self.coerce_arguments(field, definition, variables)?;
            self.check_field_selection(definition, field)?;
            plan.push(FieldPlan::Resolve {
                field,
                definition,
                arguments,
            });
        }
        Ok(plan)
    }

    fn coerce_arguments(
        &self,
        field: &Field,
        definition: &SchemaField,
        variables: &serde_json::Map<String, Json>,
    ) -> Result<serde_json::Map<String, Json>, Error> {
        for argument in &field.arguments {
            let declared = definition
                .arguments
                .iter()
                .any(|declared| declared.name == argument.name);
            if !declared {
                return Err(Error::validation_at(
                    format!(
                        "Unknown argument \"{}\" on field \"{}\"",
                        argument.name, field.name
                    ),
                    field.pos,
                ));
            }
        }

        let mut arguments = serde_json::Map::new();
        for declared in &definition.arguments {
            let supplied = field
                .arguments
                .iter()
                .find(|argument| argument.name == declared.name);
            let what = format!("Argument \"{}\"", declared.name);
            match supplied {
                Some(argument) => {
                    let coerced =
                        self.schema
                            .coerce_literal(&declared.ty, &argument.value, variables, &what)?;
                    if declared.reject_blank
                        && coerced.as_str().is_some_and(|text| text.trim().is_empty())
                    {
                        return Err(Error::validation_at(
                            format!("{what} must not be blank"),
                            field.pos,
                        ));
                    }
                    arguments.insert(declared.name.to_string(), coerced);
                }
                None if declared.ty.is_non_null() => {
                    return Err(Error::validation_at(
                        format!(
                            "Field \"{}\" argument \"{}\" of type {} is required",
                            field.name, declared.name, declared.ty
                        ),
                        field.pos,
                    ));
                }
                None => {}
            }
        }
        Ok(arguments)
    }

    /// Checks a field's subselection against its type: objects need one,
    /// leaves must not have one.
    fn check_field_selection(&self, definition: &SchemaField, field: &Field) -> Result<(), Error> {
        let type_name = definition.ty.named_type();
        let Some(ty) = self.schema.type_named(type_name) else {
            return Err(Error::validation(format!("Unknown type \"{type_name}\"")));
        };
        if matches!(ty, SchemaType::Object { .. }) {
            if field.selection_set.is_empty() {
                return Err(Error::validation_at(
                    format!(
                        "Field \"{}\" of type {} must have a selection of subfields",
                        field.name, definition.ty
                    ),
                    field.pos,
                ));
            }
            self.check_subfields(ty, &field.selection_set)
        } else if field.selection_set.is_empty() {
            Ok(())
        } else {
            Err(Error::validation_at(
                format!(
                    "Field \"{}\" of type {} has no subfields",
                    field.name, definition.ty
                ),
                field.pos,
            ))
        }
    }

    fn check_subfields(&self, parent: &SchemaType, selection: &[Field]) -> Result<(), Error> {
        for field in selection {
            if field.name == "__typename" {
                check_typename_shape(field)?;
                continue;
            }
            reject_introspection(field)?;
            let Some(definition) = parent.field(&field.name) else {
                return Err(unknown_field(field, parent));
            };
            if !field.arguments.is_empty() && definition.arguments.is_empty() {
                return Err(Error::validation_at(
                    format!("Field \"{}\" does not accept arguments", field.name),
                    field.pos,
                ));
            }
            self.check_field_selection(definition, field)?;
        }
        Ok(())
    }

    async fn resolve_root_field(
        &self,
        kind: OperationKind,
        field: &Field,
        arguments: &serde_json::Map<String, Json>,
    ) -> Result<Json, Error> {
        let value = match (kind, field.name.as_str()) {
            (OperationKind::Query, "getAllTasks") => {
                let tasks = self.store.list_all().await?;
                serde_json::to_value(tasks)?
            }
            (OperationKind::Query, "getTaskById") => {
                let id = int_argument(arguments, "id")?;
                match self.store.find_by_id(id).await? {
                    Some(task) => serde_json::to_value(task)?,
                    None => Json::Null,
                }
            }
            (OperationKind::Mutation, "createTask") => {
                let input: CreateTaskInput = input_argument(arguments, "input")?;
                let new_task = NewTask {
                    title: input.title,
                    description: input.description.unwrap_or_default(),
                    status: TaskStatus::Pending,
                };
                let created = self.store.insert(new_task).await?;
                serde_json::to_value(created)?
            }
            (OperationKind::Mutation, "updateTaskStatus") => {
                let input: UpdateTaskStatusInput = input_argument(arguments, "input")?;
                match self.store.update_status(input.id, input.status).await? {
                    Some(task) => serde_json::to_value(task)?,
                    None => Json::Null,
                }
            }
            (OperationKind::Mutation, "deleteTask") => {
                let id = int_argument(arguments, "id")?;
                Json::Bool(self.store.delete(id).await?)
            }
            _ => {
                return Err(Error::validation_at(
                    format!("no resolver for field \"{}\"", field.name),
                    field.pos,
                ));
            }
        };
        Ok(value)
    }

    /// Shapes a resolved value through the client's selection, recursing
    /// through list and non-null wrappers.
    fn project_field(
        &self,
        ty: &FieldType,
        value: &Json,
        selection: &[Field],
    ) -> Result<Json, Error> {
        match ty {
            FieldType::NonNull(inner) => self.project_field(inner, value, selection),
            FieldType::List(inner) => {
                let Json::Array(items) = value else {
                    return Ok(value.clone());
                };
                let mut projected = Vec::with_capacity(items.len());
                for item in items {
                    projected.push(self.project_field(inner, item, selection)?);
                }
                Ok(Json::Array(projected))
            }
            FieldType::Named(name) => {
                if value.is_null() {
                    return Ok(Json::Null);
                }
                let Some(schema_type) = self.schema.type_named(name) else {
                    return Err(Error::validation(format!("Unknown type \"{name}\"")));
                };
                match schema_type {
                    SchemaType::Object { .. } => self.project_object(schema_type, value, selection),
                    _ => Ok(value.clone()),
                }
            }
        }
    }

    fn project_object(
        &self,
        schema_type: &SchemaType,
        value: &Json,
        selection: &[Field],
    ) -> Result<Json, Error> {
        let Json::Object(source) = value else {
            return Ok(value.clone());
        };
        let mut projected = serde_json::Map::new();
        for field in selection {
            if field.name == "__typename" {
                let name = Json::from(schema_type.name());
                projected.insert(field.response_key().to_string(), name);
                continue;
            }
            // Planning already verified every selected field exists.
            let Some(definition) = schema_type.field(&field.name) else {
                continue;
            };
            let child = source.get(&field.name).cloned().unwrap_or(Json::Null);
            let shaped = self.project_field(&definition.ty, &child, &field.selection_set)?;
            projected.insert(field.response_key().to_string(), shaped);
        }
        Ok(Json::Object(projected))
    }
}

fn select_operation<'a>(
    document: &'a Document,
    operation_name: Option<&str>,
) -> Result<&'a Operation, Error> {
    match operation_name {
        Some(name) => document
            .operations
            .iter()
            .find(|operation| operation.name.as_deref() == Some(name))
            .ok_or_else(|| Error::validation(format!("unknown operation \"{name}\""))),
        None if document.operations.len() > 1 => Err(Error::validation(
            "operationName is required when the document contains multiple operations",
        )),
        None => Ok(&document.operations[0]),
    }
}

fn int_argument(arguments: &serde_json::Map<String, Json>, name: &str) -> Result<i32, Error> {
    arguments
        .get(name)
        .and_then(Json::as_i64)
        .and_then(|id| i32::try_from(id).ok())
        .ok_or_else(|| Error::validation(format!("Argument \"{name}\" must be an Int")))
}

fn input_argument<T: DeserializeOwned>(
    arguments: &serde_json::Map<String, Json>,
    name: &str,
) -> Result<T, Error> {
    let value = arguments.get(name).cloned().unwrap_or(Json::Null);
    serde_json::from_value(value)
        .map_err(|_| Error::validation(format!("Argument \"{name}\" is not a valid input object")))
}

fn check_typename_shape(field: &Field) -> Result<(), Error> {
    if field.arguments.is_empty() && field.selection_set.is_empty() {
        Ok(())
    } else {
        Err(Error::validation_at(
            "__typename takes no arguments and has no subfields",
            field.pos,
        ))
    }
}

fn reject_introspection(field: &Field) -> Result<(), Error> {
    if field.name.starts_with("__") {
        Err(Error::validation_at(
            format!(
                "introspection is not supported, cannot query \"{}\"",
                field.name
            ),
            field.pos,
        ))
    } else {
        Ok(())
    }
}

fn unknown_field(field: &Field, parent: &SchemaType) -> Error {
    Error::validation_at(
        format!(
            "Cannot query field \"{}\" on type \"{}\"",
            field.name,
            parent.name()
        ),
        field.pos,
    )
}
