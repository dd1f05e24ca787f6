use crate::error::AppError;
use serde_json::{Map, Value};

const BOM: char = '\u{feff}';
const DASH_FENCE: &str = "---";
const YAML_FENCE: &str = "= yaml =";
const DOCUMENT_END: &str = "...";

#[derive(Debug, Clone, PartialEq)]
pub struct FrontMatter<'a> {
    pub yaml: &'a str,
    pub body: &'a str,
}

pub fn split_front_matter(content: &str) -> Option<FrontMatter<'_>> {
    let content = content.strip_prefix(BOM).unwrap_or(content);
    let (first_line, mut offset) = next_line(content, 0)?;
    let fence = match first_line.trim_end() {
        DASH_FENCE => DASH_FENCE,
        YAML_FENCE => YAML_FENCE,
        _ => return None,
    };

    let yaml_start = offset;
    while let Some((line, next)) = next_line(content, offset) {
        let candidate = line.trim_end();
        if candidate == fence || candidate == DOCUMENT_END {
            return Some(FrontMatter {
                yaml: &content[yaml_start..offset],
                body: &content[next..],
            });
        }
        offset = next;
    }

    None
}

fn next_line(content: &str, start: usize) -> Option<(&str, usize)> {
    if start >= content.len() {
        return None;
    }
    let rest = &content[start..];
    match rest.find('\n') {
        Some(index) => Some((&rest[..index], start + index + 1)),
        None => Some((rest, content.len())),
    }
}

pub fn parse_yaml_mapping(yaml: &str) -> Result<Map<String, Value>, AppError> {
    let parsed: serde_yaml::Value = serde_yaml::from_str(yaml)
        .map_err(|err| AppError::invalid_data(format!("invalid YAML: {err}")))?;
    match parsed {
        serde_yaml::Value::Null => Ok(Map::new()),
        other => match yaml_to_json(other) {
            Value::Object(map) => Ok(map),
            _ => Err(AppError::invalid_data("YAML document is not a mapping")),
        },
    }
}

pub fn yaml_to_json(value: serde_yaml::Value) -> Value {
    match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(flag) => Value::Bool(flag),
        serde_yaml::Value::Number(number) => number_to_json(&number),
        serde_yaml::Value::String(text) => Value::String(text),
        serde_yaml::Value::Sequence(items) => {
            Value::Array(items.into_iter().map(yaml_to_json).collect())
        }
        serde_yaml::Value::Mapping(mapping) => {
            let mut object = Map::new();
            for (key, value) in mapping {
                object.insert(yaml_key(key), yaml_to_json(value));
            }
            Value::Object(object)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

fn number_to_json(number: &serde_yaml::Number) -> Value {
    if let Some(int) = number.as_i64() {
        Value::from(int)
    } else if let Some(uint) = number.as_u64() {
        Value::from(uint)
    } else {
        number
            .as_f64()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(text) => text,
        serde_yaml::Value::Null => "null".to_string(),
        serde_yaml::Value::Bool(flag) => flag.to_string(),
        serde_yaml::Value::Number(number) => number.to_string(),
        other => serde_yaml::to_string(&other)
            .map(|rendered| rendered.trim().to_string())
            .unwrap_or_default(),
    }
}
