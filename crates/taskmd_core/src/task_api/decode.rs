use crate::dates::DateResolver;
use crate::error::AppError;
use crate::markdown::front_matter::{parse_yaml_mapping, split_front_matter};
use crate::markdown::list::{ListItem, parse_list};
use crate::markdown::sections::{RAW_SECTION, Sections, parse_markdown};
use crate::model::{Comment, Metadata, Relation, SubTask, Task};
use crate::schema::{self, Schema};
use crate::utility::task_id;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use time::OffsetDateTime;

use super::{COMMENTS, METADATA, RELATIONS, SUB_TASKS};

static FENCE_OPEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^```(?:ya?ml)?[ \t]*\r?\n?").expect("valid fence regex"));
static FENCE_CLOSE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\r?\n?```$").expect("valid fence regex"));
static BLANK_LINES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:[ \t]*\r?\n){2,}").expect("valid blank line regex"));

const DATE_PREFIX: &str = "date: ";
const AUTHOR_PREFIX: &str = "author: ";

pub(super) fn decode(data: &str, resolver: &DateResolver) -> Result<Task, AppError> {
    if data.is_empty() {
        return Err(AppError::invalid_input("data is null or empty"));
    }

    let (mut metadata, body) = match split_front_matter(data) {
        Some(front) => {
            let mapping = parse_yaml_mapping(front.yaml)
                .map_err(|_| AppError::invalid_data("invalid front matter content"))?;
            (mapping, front.body)
        }
        None => (Map::new(), data),
    };

    let mut sections = parse_markdown(body).map_err(|err| {
        AppError::invalid_data(format!("invalid markdown ({})", err.message()))
    })?;

    let name = sections
        .titles()
        .find(|title| *title != RAW_SECTION && !title.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::invalid_data("data is missing a name heading"))?;

    if let Some(section) = sections.remove(METADATA) {
        metadata.extend(parse_metadata_block(&section.content)?);
    }
    let metadata = resolve_metadata(metadata, resolver)?;

    let sub_tasks = match sections.remove(SUB_TASKS) {
        Some(section) => parse_sub_tasks(&section.content)?,
        None => Vec::new(),
    };
    let relations = match sections.remove(RELATIONS) {
        Some(section) => parse_relations(&section.content)?,
        None => Vec::new(),
    };
    let comments = match sections.remove(COMMENTS) {
        Some(section) => parse_comments(&section.content, resolver)?,
        None => Vec::new(),
    };

    let description = compile_description(&sections);

    log::debug!(
        "decoded task '{}' with {} sub-tasks, {} relations, {} comments",
        name,
        sub_tasks.len(),
        relations.len(),
        comments.len()
    );

    Ok(Task {
        id: task_id(&name),
        name,
        description,
        metadata,
        sub_tasks,
        relations,
        comments,
    })
}

fn parse_metadata_block(content: &str) -> Result<Map<String, Value>, AppError> {
    let trimmed = content.trim();
    let without_open = FENCE_OPEN_RE.replace(trimmed, "");
    let yaml = FENCE_CLOSE_RE.replace(&without_open, "");
    if yaml.trim().is_empty() {
        return Err(AppError::invalid_data("invalid metadata content"));
    }
    parse_yaml_mapping(&yaml).map_err(|_| AppError::invalid_data("invalid metadata content"))
}

fn resolve_metadata(
    mut fields: Map<String, Value>,
    resolver: &DateResolver,
) -> Result<Metadata, AppError> {
    schema::validate(&Value::Object(fields.clone()), Schema::MarkdownMetadata)?;

    let created = resolve_date_field(&mut fields, "created", resolver)?;
    let updated = resolve_date_field(&mut fields, "updated", resolver)?;
    let started = resolve_date_field(&mut fields, "started", resolver)?;
    let completed = resolve_date_field(&mut fields, "completed", resolver)?;
    let due = resolve_date_field(&mut fields, "due", resolver)?;
    let progress = fields.remove("progress").map(coerce_progress).transpose()?;
    let tags = fields.remove("tags").map(|tags| {
        tags.as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    });

    Ok(Metadata {
        created,
        updated,
        started,
        completed,
        due,
        progress,
        tags,
        extra: fields,
    })
}

fn resolve_date_field(
    fields: &mut Map<String, Value>,
    field: &str,
    resolver: &DateResolver,
) -> Result<Option<OffsetDateTime>, AppError> {
    let Some(value) = fields.remove(field) else {
        return Ok(None);
    };
    value
        .as_str()
        .and_then(|text| resolver.resolve(text))
        .map(Some)
        .ok_or_else(|| AppError::invalid_data(format!("unable to parse {field} date")))
}

fn coerce_progress(value: Value) -> Result<f64, AppError> {
    let number = match &value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    number
        .filter(|number| number.is_finite())
        .ok_or_else(|| AppError::invalid_data("progress value is not numeric"))
}

fn list_items(content: &str, failure: &str) -> Result<Vec<ListItem>, AppError> {
    parse_list(content).map_err(|_| AppError::invalid_data(failure))
}

fn parse_sub_tasks(content: &str) -> Result<Vec<SubTask>, AppError> {
    let items = list_items(content, "sub-tasks must contain a list")?;
    Ok(items
        .into_iter()
        .map(|item| SubTask {
            text: item.text.trim().to_string(),
            completed: item.checked.unwrap_or(false),
        })
        .collect())
}

fn parse_relations(content: &str) -> Result<Vec<Relation>, AppError> {
    let items = list_items(content, "relations must contain a list")?;
    Ok(items.iter().map(|item| relation_from_lead(&item.lead)).collect())
}

/// The last word names the related task; any words before it are the
/// relation type.
fn relation_from_lead(lead: &str) -> Relation {
    let words: Vec<&str> = lead.split_whitespace().collect();
    match words.split_last() {
        Some((task, kind)) => Relation {
            kind: kind.join(" "),
            task: task.to_string(),
        },
        None => Relation {
            kind: String::new(),
            task: String::new(),
        },
    }
}

fn parse_comments(content: &str, resolver: &DateResolver) -> Result<Vec<Comment>, AppError> {
    let items = list_items(content, "comments must contain a list")?;
    items
        .iter()
        .map(|item| parse_comment(&item.text, resolver))
        .collect()
}

fn parse_comment(text: &str, resolver: &DateResolver) -> Result<Comment, AppError> {
    let mut author = None;
    let mut date = None;
    let mut lines = Vec::new();

    for line in text.split('\n') {
        if let Some(raw) = line.strip_prefix(DATE_PREFIX) {
            let resolved = resolver.resolve(raw).ok_or_else(|| {
                AppError::invalid_data("comments must contain a list (unable to parse comment date)")
            })?;
            date = Some(resolved);
        } else if let Some(name) = line.strip_prefix(AUTHOR_PREFIX) {
            author = Some(name.trim().to_string());
        } else {
            lines.push(line);
        }
    }

    Ok(Comment {
        author,
        date,
        text: lines.join("\n").trim().to_string(),
    })
}

fn compile_description(sections: &Sections) -> String {
    let mut parts = Vec::new();
    if let Some(raw) = sections.get(RAW_SECTION) {
        parts.push(collapse_blank_lines(&raw.content));
    }

    for (title, section) in sections.iter() {
        if title == RAW_SECTION {
            continue;
        }
        if !section.is_top_level() && !title.is_empty() {
            parts.push(section.heading.clone());
        }
        parts.push(section.content.clone());
    }

    let joined = parts
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");
    collapse_blank_lines(&joined).trim().to_string()
}

fn collapse_blank_lines(text: &str) -> String {
    BLANK_LINES_RE.replace_all(text, "\n\n").into_owned()
}
