use crate::config::Palette;
use serde_json::Value;
use std::cmp::Ordering;
use time::OffsetDateTime;

pub fn task_id(name: &str) -> String {
    let mut slug = String::new();
    let mut previous_hyphen = false;

    for ch in name.chars() {
        if ch.is_alphanumeric() {
            slug.extend(ch.to_lowercase());
            previous_hyphen = false;
        } else if !previous_hyphen && !slug.is_empty() {
            slug.push('-');
            previous_hyphen = true;
        }
    }

    slug.trim_matches('-').to_string()
}

pub fn str_arg(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Array(items) => {
            let joined = items
                .iter()
                .filter_map(str_arg)
                .collect::<Vec<_>>()
                .join(" ");
            (!joined.is_empty()).then_some(joined)
        }
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Object(_) => None,
    }
}

pub fn array_arg(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(str_arg).collect(),
        Value::String(text) => text
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect(),
        other => str_arg(other).into_iter().collect(),
    }
}

pub fn compare_dates(a: OffsetDateTime, b: OffsetDateTime) -> Ordering {
    a.date().cmp(&b.to_offset(a.offset()).date())
}

pub fn same_day(a: OffsetDateTime, b: OffsetDateTime) -> bool {
    compare_dates(a, b) == Ordering::Equal
}

pub fn replace_tags(text: &str, palette: &Palette) -> String {
    let mut output = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find('{') {
        output.push_str(&rest[..start]);
        let candidate = &rest[start..];
        let Some(end) = candidate.find('}') else {
            output.push_str(candidate);
            return output;
        };

        let inner = &candidate[1..end];
        let (closing, name) = match inner.strip_prefix('/') {
            Some(name) => (true, name),
            None => (false, inner),
        };
        match palette.style(name) {
            Some(style) if closing => {
                if !style.is_empty() {
                    output.push_str(palette.reset());
                }
            }
            Some(style) => output.push_str(style),
            None => output.push_str(&candidate[..=end]),
        }
        rest = &candidate[end + 1..];
    }

    output.push_str(rest);
    output
}
