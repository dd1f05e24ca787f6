mod decode;
mod encode;

use crate::config::{Config, ConfigOverrides, merge_overrides};
use crate::dates::DateResolver;
use crate::error::AppError;
use crate::model::Task;
use serde_json::Value;

pub(crate) const METADATA: &str = "Metadata";
pub(crate) const SUB_TASKS: &str = "Sub-tasks";
pub(crate) const RELATIONS: &str = "Relations";
pub(crate) const COMMENTS: &str = "Comments";

pub fn md2json(data: &str) -> Result<Task, AppError> {
    md2json_with_overrides(data, &ConfigOverrides::default())
}

/// Environment configuration with `overrides` applied on top.
pub fn md2json_with_overrides(data: &str, overrides: &ConfigOverrides) -> Result<Task, AppError> {
    let config = merge_overrides(&Config::from_env(), overrides);
    md2json_with(data, &DateResolver::from_config(&config))
}

pub fn md2json_with(data: &str, resolver: &DateResolver) -> Result<Task, AppError> {
    decode::decode(data, resolver).map_err(|err| {
        log::debug!("markdown decode failed: {}", err.message());
        err.into_decode()
    })
}

pub fn md2json_value(data: &Value) -> Result<Task, AppError> {
    if is_falsy(data) {
        return Err(AppError::invalid_input("data is null or empty").into_decode());
    }
    match data {
        Value::String(text) => md2json(text),
        _ => Err(AppError::invalid_input("data is not a string").into_decode()),
    }
}

pub fn json2md(data: &Value) -> Result<String, AppError> {
    encode::encode(data).map_err(|err| {
        log::debug!("markdown encode failed: {}", err.message());
        err.into_encode()
    })
}

pub fn task_to_markdown(task: &Task) -> Result<String, AppError> {
    let value = serde_json::to_value(task).map_err(|err| AppError::encode(err.to_string()))?;
    json2md(&value)
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::{is_falsy, json2md, md2json_value, md2json_with, md2json_with_overrides};
    use crate::config::ConfigOverrides;
    use crate::dates::DateResolver;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use time::macros::{datetime, offset};

    fn resolver() -> DateResolver {
        DateResolver::new(datetime!(2024-03-13 15:30 UTC))
    }

    #[test]
    fn falsy_values_match_loose_truthiness() {
        for value in [json!(null), json!(false), json!(0), json!(0.0), json!("")] {
            assert!(is_falsy(&value), "{value}");
        }
        for value in [json!(true), json!(1), json!(" "), json!([]), json!({})] {
            assert!(!is_falsy(&value), "{value}");
        }
    }

    #[test]
    fn decode_errors_carry_parse_prefix() {
        let err = md2json_with("", &resolver()).unwrap_err();
        assert_eq!(err.to_string(), "Unable to parse task: data is null or empty");
        assert_eq!(err.code(), "decode_error");
    }

    #[test]
    fn overrides_set_offset_for_offset_free_dates() {
        let overrides = ConfigOverrides {
            theme: None,
            utc_offset: Some("+05:30".to_string()),
        };
        let task =
            md2json_with_overrides("---\ncreated: 2021-01-01\n---\n# T", &overrides).unwrap();

        assert_eq!(task.metadata.created, Some(datetime!(2021-01-01 0:00 +05:30)));
        assert_eq!(
            task.metadata.created.map(|created| created.offset()),
            Some(offset!(+05:30))
        );
    }

    #[test]
    fn untyped_input_must_be_string() {
        let err = md2json_value(&json!(42)).unwrap_err();
        assert_eq!(err.to_string(), "Unable to parse task: data is not a string");

        let err = md2json_value(&json!(null)).unwrap_err();
        assert_eq!(err.to_string(), "Unable to parse task: data is null or empty");

        let task = md2json_value(&json!("# Hello")).unwrap();
        assert_eq!(task.name, "Hello");
    }

    #[test]
    fn encode_errors_carry_build_prefix() {
        let err = json2md(&json!([1, 2])).unwrap_err();
        assert_eq!(err.to_string(), "Unable to build task: data is not an object");
        assert_eq!(err.code(), "encode_error");
    }
}
