use crate::error::AppError;
use crate::model::{Comment, Metadata, Relation, SubTask};
use crate::schema::{self, Schema};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use time::format_description::well_known::Rfc3339;

use super::{COMMENTS, RELATIONS, SUB_TASKS, is_falsy};

pub(super) fn encode(data: &Value) -> Result<String, AppError> {
    if is_falsy(data) {
        return Err(AppError::invalid_input("data is null or empty"));
    }
    let Value::Object(object) = data else {
        return Err(AppError::invalid_input("data is not an object"));
    };
    let name = match object.get("name") {
        Some(Value::String(name)) if !name.is_empty() => name,
        _ => return Err(AppError::invalid_input("data object is missing name")),
    };

    let metadata: Option<Metadata> = typed_part(object, "metadata", Schema::JsonMetadata)?;
    let sub_tasks: Option<Vec<SubTask>> = typed_part(object, "subTasks", Schema::SubTasks)?;
    let relations: Option<Vec<Relation>> = typed_part(object, "relations", Schema::Relations)?;
    let comments: Option<Vec<Comment>> = typed_part(object, "comments", Schema::Comments)?;

    let mut pieces = Vec::new();
    if let Some(metadata) = metadata.filter(|metadata| !metadata.is_empty()) {
        pieces.push(render_front_matter(&metadata)?);
    }
    pieces.push(format!("# {name}"));
    pieces.push(description_text(object.get("description")));
    if let Some(sub_tasks) = sub_tasks.filter(|items| !items.is_empty()) {
        pieces.push(render_section(SUB_TASKS, sub_tasks.iter().map(render_sub_task)));
    }
    if let Some(relations) = relations.filter(|items| !items.is_empty()) {
        pieces.push(render_section(RELATIONS, relations.iter().map(render_relation)));
    }
    if let Some(comments) = comments.filter(|items| !items.is_empty()) {
        let rendered = comments
            .iter()
            .map(render_comment)
            .collect::<Result<Vec<_>, _>>()?;
        pieces.push(render_section(COMMENTS, rendered.into_iter()));
    }

    let body = pieces
        .into_iter()
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");
    log::debug!("encoded task '{}' ({} bytes)", name, body.len() + 1);
    Ok(format!("{body}\n"))
}

fn typed_part<T: DeserializeOwned>(
    object: &Map<String, Value>,
    key: &str,
    schema: Schema,
) -> Result<Option<T>, AppError> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => {
            schema::validate(value, schema)?;
            serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|err| AppError::invalid_data(format!("invalid {key}: {err}")))
        }
    }
}

fn description_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.trim().to_string(),
        Some(other) => other.to_string(),
    }
}

fn render_front_matter(metadata: &Metadata) -> Result<String, AppError> {
    let yaml = serde_yaml::to_string(metadata)
        .map_err(|err| AppError::invalid_data(format!("invalid metadata: {err}")))?;
    Ok(format!("---\n{}\n---", yaml.trim()))
}

fn render_section<I>(title: &str, items: I) -> String
where
    I: Iterator<Item = String>,
{
    let mut section = format!("## {title}\n");
    for item in items {
        section.push('\n');
        section.push_str(&item);
    }
    section
}

fn render_sub_task(sub_task: &SubTask) -> String {
    let mark = if sub_task.completed { 'x' } else { ' ' };
    format!("- [{mark}] {}", sub_task.text.trim())
}

fn render_relation(relation: &Relation) -> String {
    let task = relation.task.trim();
    let kind = relation.kind.trim();
    if kind.is_empty() {
        format!("- [{task}]({task}.md)")
    } else {
        format!("- [{kind} {task}]({task}.md)")
    }
}

fn render_comment(comment: &Comment) -> Result<String, AppError> {
    let mut lines = Vec::new();
    if let Some(author) = &comment.author {
        lines.push(format!("author: {}", author.trim()));
    }
    if let Some(date) = comment.date {
        let stamp = date
            .format(&Rfc3339)
            .map_err(|err| AppError::invalid_data(format!("invalid comment date: {err}")))?;
        lines.push(format!("date: {stamp}"));
    }
    lines.extend(comment.text.trim().lines().map(str::to_string));

    let mut item = String::from("-");
    for (index, line) in lines.iter().enumerate() {
        match (index, line.trim().is_empty()) {
            (0, _) => {
                item.push(' ');
                item.push_str(line);
            }
            (_, true) => item.push('\n'),
            (_, false) => {
                item.push_str("\n  ");
                item.push_str(line);
            }
        }
    }
    Ok(item)
}

#[cfg(test)]
mod tests {
    use super::{render_comment, render_relation, render_sub_task};
    use crate::model::{Comment, Relation, SubTask};
    use time::macros::datetime;

    #[test]
    fn sub_tasks_render_as_task_list_items() {
        let done = SubTask {
            text: "ship it".to_string(),
            completed: true,
        };
        let open = SubTask {
            text: "test it".to_string(),
            completed: false,
        };
        assert_eq!(render_sub_task(&done), "- [x] ship it");
        assert_eq!(render_sub_task(&open), "- [ ] test it");
    }

    #[test]
    fn relations_render_as_links() {
        let typed = Relation {
            kind: "blocks".to_string(),
            task: "task-2".to_string(),
        };
        let untyped = Relation {
            kind: String::new(),
            task: "task-3".to_string(),
        };
        assert_eq!(render_relation(&typed), "- [blocks task-2](task-2.md)");
        assert_eq!(render_relation(&untyped), "- [task-3](task-3.md)");
    }

    #[test]
    fn comments_indent_continuation_lines() {
        let comment = Comment {
            author: Some("ana".to_string()),
            date: Some(datetime!(2021-01-02 10:00 UTC)),
            text: "first\n\nsecond".to_string(),
        };
        assert_eq!(
            render_comment(&comment).unwrap(),
            "- author: ana\n  date: 2021-01-02T10:00:00Z\n  first\n\n  second"
        );
    }

    #[test]
    fn comment_with_only_text_is_single_item() {
        let comment = Comment {
            author: None,
            date: None,
            text: "looks good".to_string(),
        };
        assert_eq!(render_comment(&comment).unwrap(), "- looks good");
    }
}
