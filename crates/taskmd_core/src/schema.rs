use crate::error::AppError;
use jsonschema::Validator;
use jsonschema::error::{TypeKind, ValidationErrorKind};
use once_cell::sync::Lazy;
use serde_json::{Value, json};

const DATE_FIELDS: [&str; 5] = ["created", "updated", "started", "completed", "due"];

static MARKDOWN_METADATA: Lazy<Result<Validator, String>> =
    Lazy::new(|| compile(Schema::MarkdownMetadata));
static JSON_METADATA: Lazy<Result<Validator, String>> =
    Lazy::new(|| compile(Schema::JsonMetadata));
static SUB_TASKS: Lazy<Result<Validator, String>> = Lazy::new(|| compile(Schema::SubTasks));
static RELATIONS: Lazy<Result<Validator, String>> = Lazy::new(|| compile(Schema::Relations));
static COMMENTS: Lazy<Result<Validator, String>> = Lazy::new(|| compile(Schema::Comments));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    MarkdownMetadata,
    JsonMetadata,
    SubTasks,
    Relations,
    Comments,
}

impl Schema {
    pub fn document(self) -> Value {
        match self {
            Schema::MarkdownMetadata => {
                metadata_schema(json!({ "type": "string" }), json!(["number", "string"]))
            }
            Schema::JsonMetadata => metadata_schema(
                json!({ "type": "string", "format": "date-time" }),
                json!("number"),
            ),
            Schema::SubTasks => array_of(
                json!({
                    "text": { "type": "string" },
                    "completed": { "type": "boolean" }
                }),
                &["text", "completed"],
            ),
            Schema::Relations => array_of(
                json!({
                    "type": { "type": "string" },
                    "task": { "type": "string" }
                }),
                &["type", "task"],
            ),
            Schema::Comments => array_of(
                json!({
                    "author": { "type": "string" },
                    "date": { "type": "string", "format": "date-time" },
                    "text": { "type": "string" }
                }),
                &["text"],
            ),
        }
    }

    pub fn validator(self) -> Result<&'static Validator, AppError> {
        let compiled = match self {
            Schema::MarkdownMetadata => &*MARKDOWN_METADATA,
            Schema::JsonMetadata => &*JSON_METADATA,
            Schema::SubTasks => &*SUB_TASKS,
            Schema::Relations => &*RELATIONS,
            Schema::Comments => &*COMMENTS,
        };
        compiled
            .as_ref()
            .map_err(|err| AppError::invalid_data(format!("invalid schema: {err}")))
    }
}

fn compile(schema: Schema) -> Result<Validator, String> {
    jsonschema::options()
        .should_validate_formats(true)
        .build(&schema.document())
        .map_err(|err| err.to_string())
}

fn metadata_schema(date: Value, progress: Value) -> Value {
    let mut properties = serde_json::Map::new();
    for field in DATE_FIELDS {
        properties.insert(field.to_string(), date.clone());
    }
    properties.insert("progress".to_string(), json!({ "type": progress }));
    properties.insert(
        "tags".to_string(),
        json!({ "type": "array", "items": { "type": "string" } }),
    );

    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "properties": properties
    })
}

fn array_of(properties: Value, required: &[&str]) -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "array",
        "items": {
            "type": "object",
            "properties": properties,
            "required": required
        }
    })
}

pub fn validate(instance: &Value, schema: Schema) -> Result<(), AppError> {
    let validator = schema.validator()?;
    let errors: Vec<String> = validator
        .iter_errors(instance)
        .map(|error| {
            format!(
                "{} {}",
                property_path(&error.instance_path.to_string()),
                describe(&error.kind, &error.to_string())
            )
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::invalid_data(errors.join("\n")))
    }
}

fn property_path(pointer: &str) -> String {
    let mut path = String::from("instance");
    for segment in pointer.split('/').filter(|segment| !segment.is_empty()) {
        let segment = segment.replace("~1", "/").replace("~0", "~");
        if segment.chars().all(|ch| ch.is_ascii_digit()) {
            path.push_str(&format!("[{segment}]"));
        } else {
            path.push('.');
            path.push_str(&segment);
        }
    }
    path
}

fn describe(kind: &ValidationErrorKind, fallback: &str) -> String {
    match kind {
        ValidationErrorKind::Type {
            kind: TypeKind::Single(expected),
        } => format!("is not of a type(s) {expected}"),
        ValidationErrorKind::Type {
            kind: TypeKind::Multiple(expected),
        } => {
            let names: Vec<String> = expected
                .into_iter()
                .map(|primitive| primitive.to_string())
                .collect();
            format!("is not of a type(s) {}", names.join(","))
        }
        ValidationErrorKind::Required { property } => format!("requires property {property}"),
        ValidationErrorKind::Format { format } => {
            format!("does not conform to the \"{format}\" format")
        }
        _ => fallback.to_string(),
    }
}
