//! Schema definition for the task API and coercion of JSON input against it.
//!
//! The schema is a plain data structure: named types in a map plus the two
//! root object names. Coercion turns client-supplied JSON (variables and
//! argument literals) into canonical values, rejecting anything the declared
//! type does not admit. `Display` renders the whole schema as SDL.

use std::collections::BTreeMap;
use std::fmt;

use chrono::DateTime;
use serde_json::Value;

use super::Error;
use super::ast::{self, OperationKind};

/// Scalars every GraphQL service provides. They take part in coercion but
/// are left out of the rendered SDL.
const BUILT_IN_SCALARS: [&str; 4] = ["Boolean", "Float", "Int", "String"];

/// A type reference as it appears in a field or argument position.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    Named(&'static str),
    NonNull(Box<FieldType>),
    List(Box<FieldType>),
}

impl FieldType {
    pub fn is_non_null(&self) -> bool {
        matches!(self, FieldType::NonNull(_))
    }

    /// The named type at the bottom of any list/non-null wrapping.
    pub fn named_type(&self) -> &'static str {
        match self {
            FieldType::Named(name) => name,
            FieldType::NonNull(inner) | FieldType::List(inner) => inner.named_type(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Named(name) => write!(f, "{name}"),
            FieldType::NonNull(inner) => write!(f, "{inner}!"),
            FieldType::List(inner) => write!(f, "[{inner}]"),
        }
    }
}

/// An argument or input object field declaration.
#[derive(Debug, Clone)]
pub struct InputValue {
    pub name: &'static str,
    pub ty: FieldType,
    /// Rejects values that trim to an empty string. `String!` alone still
    /// admits `""`, and some fields must carry actual content.
    pub reject_blank: bool,
}

/// An output field on an object type.
#[derive(Debug, Clone)]
pub struct SchemaField {
    pub name: &'static str,
    pub ty: FieldType,
    pub arguments: Vec<InputValue>,
}

#[derive(Debug, Clone)]
pub enum SchemaType {
    Scalar {
        name: &'static str,
    },
    Enum {
        name: &'static str,
        values: Vec<&'static str>,
    },
    Object {
        name: &'static str,
        fields: Vec<SchemaField>,
    },
    InputObject {
        name: &'static str,
        fields: Vec<InputValue>,
    },
}

impl SchemaType {
    pub fn name(&self) -> &'static str {
        match self {
            SchemaType::Scalar { name }
            | SchemaType::Enum { name, .. }
            | SchemaType::Object { name, .. }
            | SchemaType::InputObject { name, .. } => name,
        }
    }

    /// Looks up an output field; only object types have any.
    pub fn field(&self, field_name: &str) -> Option<&SchemaField> {
        match self {
            SchemaType::Object { fields, .. } => {
                fields.iter().find(|field| field.name == field_name)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GraphQLSchema {
    types: BTreeMap<&'static str, SchemaType>,
    query_type: &'static str,
    mutation_type: &'static str,
}

impl GraphQLSchema {
    pub fn type_named(&self, name: &str) -> Option<&SchemaType> {
        self.types.get(name)
    }

    /// Root object for an operation kind. Subscriptions have no root here,
    /// so documents using them fail validation before execution.
    pub fn operation_root(&self, kind: OperationKind) -> Option<&SchemaType> {
        let name = match kind {
            OperationKind::Query => self.query_type,
            OperationKind::Mutation => self.mutation_type,
            OperationKind::Subscription => return None,
        };
        self.types.get(name)
    }

    /// Coerces a JSON value against a schema type, returning the canonical
    /// representation. `what` names the value in error messages, for example
    /// `Variable "$id"` or `Argument "input"`.
    pub fn coerce_json(&self, ty: &FieldType, value: &Value, what: &str) -> Result<Value, Error> {
        match ty {
            FieldType::NonNull(inner) => {
                if value.is_null() {
                    return Err(Error::validation(format!(
                        "{what} of non-null type {ty} must not be null"
                    )));
                }
                self.coerce_json(inner, value, what)
            }
            FieldType::List(inner) => {
                if value.is_null() {
                    return Ok(Value::Null);
                }
                // A single value in list position becomes a one-element list.
                let items = match value {
                    Value::Array(items) => items.clone(),
                    other => vec![other.clone()],
                };
                let mut coerced = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    coerced.push(self.coerce_json(inner, item, &format!("{what}[{index}]"))?);
                }
                Ok(Value::Array(coerced))
            }
            FieldType::Named(name) => {
                if value.is_null() {
                    return Ok(Value::Null);
                }
                self.coerce_named(name, value, what)
            }
        }
    }

    fn coerce_named(&self, name: &str, value: &Value, what: &str) -> Result<Value, Error> {
        let Some(ty) = self.type_named(name) else {
            return Err(Error::validation(format!("Unknown type \"{name}\"")));
        };
        match ty {
            SchemaType::Scalar { name } => coerce_scalar(name, value, what),
            SchemaType::Enum { name, values } => {
                let known = value.as_str().is_some_and(|text| values.contains(&text));
                if known {
                    Ok(value.clone())
                } else {
                    Err(Error::validation(format!(
                        "{what} is not a valid {name}, expected one of: {}",
                        values.join(", ")
                    )))
                }
            }
            SchemaType::Object { name, .. } => Err(Error::validation(format!(
                "{what} of type {name} cannot be used as an input"
            ))),
            SchemaType::InputObject { name, fields } => {
                self.coerce_input_object(name, fields, value, what)
            }
        }
    }

    /// Coerces a document literal against a schema type. Literals keep the
    /// distinction JSON lacks: `"PENDING"` does not satisfy an enum position
    /// and a bare `PENDING` does not satisfy String. A variable reference
    /// hands its JSON value to [`GraphQLSchema::coerce_json`] instead.
    pub fn coerce_literal(
        &self,
        ty: &FieldType,
        value: &ast::Value,
        variables: &serde_json::Map<String, Value>,
        what: &str,
    ) -> Result<Value, Error> {
        if let ast::Value::Variable(name) = value {
            let Some(provided) = variables.get(name) else {
                return Err(Error::validation(format!(
                    "Variable \"${name}\" is not defined by the operation"
                )));
            };
            return self.coerce_json(ty, provided, what);
        }

        match ty {
            FieldType::NonNull(inner) => {
                if matches!(value, ast::Value::Null) {
                    return Err(Error::validation(format!(
                        "{what} of non-null type {ty} must not be null"
                    )));
                }
                self.coerce_literal(inner, value, variables, what)
            }
            FieldType::List(inner) => match value {
                ast::Value::Null => Ok(Value::Null),
                ast::Value::List(items) => {
                    let mut coerced = Vec::with_capacity(items.len());
                    for (index, item) in items.iter().enumerate() {
                        coerced.push(self.coerce_literal(
                            inner,
                            item,
                            variables,
                            &format!("{what}[{index}]"),
                        )?);
                    }
                    Ok(Value::Array(coerced))
                }
                // A single value in list position becomes a one-element list.
                single => Ok(Value::Array(vec![
                    self.coerce_literal(inner, single, variables, what)?,
                ])),
            },
            FieldType::Named(name) => {
                if matches!(value, ast::Value::Null) {
                    return Ok(Value::Null);
                }
                self.coerce_named_literal(name, value, variables, what)
            }
        }
    }

    fn coerce_named_literal(
        &self,
        name: &str,
        value: &ast::Value,
        variables: &serde_json::Map<String, Value>,
        what: &str,
    ) -> Result<Value, Error> {
        let Some(ty) = self.type_named(name) else {
            return Err(Error::validation(format!("Unknown type \"{name}\"")));
        };
        match ty {
            SchemaType::Scalar { name } => coerce_scalar_literal(name, value, what),
            SchemaType::Enum { name, values } => match value {
                ast::Value::Enum(spelled) if values.contains(&spelled.as_str()) => {
                    Ok(Value::from(spelled.clone()))
                }
                ast::Value::String(_) => Err(Error::validation(format!(
                    "{what} must be written as an enum literal, not a string"
                ))),
                _ => Err(Error::validation(format!(
                    "{what} is not a valid {name}, expected one of: {}",
                    values.join(", ")
                ))),
            },
            SchemaType::Object { name, .. } => Err(Error::validation(format!(
                "{what} of type {name} cannot be used as an input"
            ))),
            SchemaType::InputObject { name, fields } => {
                self.coerce_literal_object(name, fields, value, variables, what)
            }
        }
    }

    fn coerce_literal_object(
        &self,
        name: &str,
        fields: &[InputValue],
        value: &ast::Value,
        variables: &serde_json::Map<String, Value>,
        what: &str,
    ) -> Result<Value, Error> {
        let ast::Value::Object(entries) = value else {
            return Err(Error::validation(format!(
                "{what} must be an input object of type {name}"
            )));
        };
        for (key, _) in entries {
            if !fields.iter().any(|field| field.name == key) {
                return Err(Error::validation(format!(
                    "Field \"{key}\" is not defined by type {name}"
                )));
            }
        }

        let mut coerced = serde_json::Map::new();
        for field in fields {
            let field_what = format!("{what}.{}", field.name);
            match entries.iter().find(|(key, _)| key.as_str() == field.name) {
                Some((_, provided)) => {
                    let checked = self.coerce_literal(&field.ty, provided, variables, &field_what)?;
                    if field.reject_blank
                        && checked.as_str().is_some_and(|text| text.trim().is_empty())
                    {
                        return Err(Error::validation(format!("{field_what} must not be blank")));
                    }
                    coerced.insert(field.name.to_string(), checked);
                }
                None if field.ty.is_non_null() => {
                    return Err(Error::validation(format!(
                        "{what} is missing required field \"{}\"",
                        field.name
                    )));
                }
                // Absent optional fields stay absent rather than becoming null.
                None => {}
            }
        }
        Ok(Value::Object(coerced))
    }

    fn coerce_input_object(
        &self,
        name: &str,
        fields: &[InputValue],
        value: &Value,
        what: &str,
    ) -> Result<Value, Error> {
        let Some(object) = value.as_object() else {
            return Err(Error::validation(format!(
                "{what} must be an input object of type {name}"
            )));
        };
        for key in object.keys() {
            if !fields.iter().any(|field| field.name == key) {
                return Err(Error::validation(format!(
                    "Field \"{key}\" is not defined by type {name}"
                )));
            }
        }

        let mut coerced = serde_json::Map::new();
        for field in fields {
            let field_what = format!("{what}.{}", field.name);
            match object.get(field.name) {
                Some(provided) => {
                    let checked = self.coerce_json(&field.ty, provided, &field_what)?;
                    if field.reject_blank
                        && checked.as_str().is_some_and(|text| text.trim().is_empty())
                    {
                        return Err(Error::validation(format!("{field_what} must not be blank")));
                    }
                    coerced.insert(field.name.to_string(), checked);
                }
                None if field.ty.is_non_null() => {
                    return Err(Error::validation(format!(
                        "{what} is missing required field \"{}\"",
                        field.name
                    )));
                }
                // Absent optional fields stay absent rather than becoming null.
                None => {}
            }
        }
        Ok(Value::Object(coerced))
    }
}

fn coerce_scalar(name: &str, value: &Value, what: &str) -> Result<Value, Error> {
    let coerced = match name {
        "Int" => value
            .as_i64()
            .filter(|n| i32::try_from(*n).is_ok())
            .map(Value::from),
        "Float" => value.as_f64().map(Value::from),
        "String" => value.as_str().map(Value::from),
        "Boolean" => value.as_bool().map(Value::from),
        "DateTime" => value
            .as_str()
            .filter(|text| DateTime::parse_from_rfc3339(text).is_ok())
            .map(Value::from),
        _ => None,
    };
    coerced.ok_or_else(|| Error::validation(format!("{what} is not a valid {name}")))
}

fn coerce_scalar_literal(name: &str, value: &ast::Value, what: &str) -> Result<Value, Error> {
    let coerced = match (name, value) {
        ("Int", ast::Value::Int(n)) => i32::try_from(*n).ok().map(Value::from),
        ("Float", ast::Value::Float(f)) => Some(Value::from(*f)),
        // Integer literals satisfy Float positions.
        ("Float", ast::Value::Int(n)) => Some(Value::from(*n as f64)),
        ("String", ast::Value::String(text)) => Some(Value::from(text.clone())),
        ("Boolean", ast::Value::Boolean(flag)) => Some(Value::from(*flag)),
        ("DateTime", ast::Value::String(text)) if DateTime::parse_from_rfc3339(text).is_ok() => {
            Some(Value::from(text.clone()))
        }
        _ => None,
    };
    coerced.ok_or_else(|| Error::validation(format!("{what} is not a valid {name}")))
}

impl fmt::Display for GraphQLSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, ty) in &self.types {
            if BUILT_IN_SCALARS.contains(name) {
                continue;
            }
            if !first {
                writeln!(f)?;
            }
            first = false;
            match ty {
                SchemaType::Scalar { name } => writeln!(f, "scalar {name}")?,
                SchemaType::Enum { name, values } => {
                    writeln!(f, "enum {name} {{")?;
                    for value in values {
                        writeln!(f, "  {value}")?;
                    }
                    writeln!(f, "}}")?;
                }
                SchemaType::Object { name, fields } => {
                    writeln!(f, "type {name} {{")?;
                    for field in fields {
                        writeln!(f, "  {}", render_field(field))?;
                    }
                    writeln!(f, "}}")?;
                }
                SchemaType::InputObject { name, fields } => {
                    writeln!(f, "input {name} {{")?;
                    for field in fields {
                        writeln!(f, "  {}: {}", field.name, field.ty)?;
                    }
                    writeln!(f, "}}")?;
                }
            }
        }
        Ok(())
    }
}

fn render_field(field: &SchemaField) -> String {
    if field.arguments.is_empty() {
        return format!("{}: {}", field.name, field.ty);
    }
    let arguments = field
        .arguments
        .iter()
        .map(|argument| format!("{}: {}", argument.name, argument.ty))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{}({}): {}", field.name, arguments, field.ty)
}

/// Builds the schema served by the task API.
pub fn task_schema() -> GraphQLSchema {
    let mut types = BTreeMap::new();
    for scalar in BUILT_IN_SCALARS {
        types.insert(scalar, SchemaType::Scalar { name: scalar });
    }
    types.insert("DateTime", SchemaType::Scalar { name: "DateTime" });
    types.insert(
        "TaskStatus",
        SchemaType::Enum {
            name: "TaskStatus",
            values: vec!["PENDING", "COMPLETED"],
        },
    );
    types.insert(
        "Task",
        SchemaType::Object {
            name: "Task",
            fields: vec![
                field("id", non_null(named("Int"))),
                field("title", non_null(named("String"))),
                field("description", non_null(named("String"))),
                field("status", non_null(named("TaskStatus"))),
                field("createdAt", non_null(named("DateTime"))),
                field("updatedAt", non_null(named("DateTime"))),
            ],
        },
    );
    types.insert(
        "CreateTaskInput",
        SchemaType::InputObject {
            name: "CreateTaskInput",
            fields: vec![
                non_blank_input("title", non_null(named("String"))),
                input("description", named("String")),
            ],
        },
    );
    types.insert(
        "UpdateTaskStatusInput",
        SchemaType::InputObject {
            name: "UpdateTaskStatusInput",
            fields: vec![
                input("id", non_null(named("Int"))),
                input("status", non_null(named("TaskStatus"))),
            ],
        },
    );
    types.insert(
        "Query",
        SchemaType::Object {
            name: "Query",
            fields: vec![
                field("getAllTasks", non_null(list(non_null(named("Task"))))),
                field_with_args(
                    "getTaskById",
                    named("Task"),
                    vec![input("id", non_null(named("Int")))],
                ),
            ],
        },
    );
    types.insert(
        "Mutation",
        SchemaType::Object {
            name: "Mutation",
            fields: vec![
                field_with_args(
                    "createTask",
                    non_null(named("Task")),
                    vec![input("input", non_null(named("CreateTaskInput")))],
                ),
                field_with_args(
                    "updateTaskStatus",
                    named("Task"),
                    vec![input("input", non_null(named("UpdateTaskStatusInput")))],
                ),
                field_with_args(
                    "deleteTask",
                    non_null(named("Boolean")),
                    vec![input("id", non_null(named("Int")))],
                ),
            ],
        },
    );

    GraphQLSchema {
        types,
        query_type: "Query",
        mutation_type: "Mutation",
    }
}

fn named(name: &'static str) -> FieldType {
    FieldType::Named(name)
}

fn non_null(inner: FieldType) -> FieldType {
    FieldType::NonNull(Box::new(inner))
}

fn list(inner: FieldType) -> FieldType {
    FieldType::List(Box::new(inner))
}

fn field(name: &'static str, ty: FieldType) -> SchemaField {
    SchemaField {
        name,
        ty,
        arguments: Vec::new(),
    }
}

fn field_with_args(name: &'static str, ty: FieldType, arguments: Vec<InputValue>) -> SchemaField {
    SchemaField {
        name,
        ty,
        arguments,
    }
}

fn input(name: &'static str, ty: FieldType) -> InputValue {
    InputValue {
        name,
        ty,
        reject_blank: false,
    }
}

fn non_blank_input(name: &'static str, ty: FieldType) -> InputValue {
    InputValue {
        name,
        ty,
        reject_blank: true,
    }
}
