use crate::error::AppError;
use once_cell::sync::Lazy;
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use regex::Regex;
use std::ops::Range;

static MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[ \t]*(?:[-*+]|\d{1,9}[.)])(?:[ \t]+|$)").expect("valid list marker regex")
});
static CHECKBOX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[[ xX]\](?:[ \t]+|$)").expect("valid checkbox regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub text: String,
    pub checked: Option<bool>,
    /// Plain text of the first inline token: the text of a leading link or
    /// code span, or the leading run of text up to the first line break.
    pub lead: String,
}

#[derive(Default)]
struct ItemBuilder {
    range: Range<usize>,
    checked: Option<bool>,
    lead: String,
    lead_done: bool,
    wrap_depth: usize,
}

impl ItemBuilder {
    fn new(range: Range<usize>) -> Self {
        Self {
            range,
            ..Self::default()
        }
    }

    fn push_text(&mut self, text: &str) {
        if !self.lead_done {
            self.lead.push_str(text);
        }
    }

    fn push_code(&mut self, code: &str) {
        if self.lead_done {
            return;
        }
        if self.wrap_depth > 0 {
            self.lead.push_str(code);
        } else if self.lead.is_empty() {
            self.lead.push_str(code);
            self.lead_done = true;
        } else {
            self.lead_done = true;
        }
    }

    fn open_inline(&mut self) {
        if self.lead_done {
            return;
        }
        if self.wrap_depth > 0 {
            self.wrap_depth += 1;
        } else if self.lead.is_empty() {
            self.wrap_depth = 1;
        } else {
            self.lead_done = true;
        }
    }

    fn close_inline(&mut self) {
        if self.wrap_depth > 0 {
            self.wrap_depth -= 1;
            if self.wrap_depth == 0 {
                self.lead_done = true;
            }
        }
    }

    fn boundary(&mut self) {
        if self.wrap_depth == 0 && !self.lead.is_empty() {
            self.lead_done = true;
        }
    }

    fn finish(self, source: &str) -> ListItem {
        let raw = &source[self.range.clone()];
        ListItem {
            text: item_text(raw, self.checked.is_some()),
            checked: self.checked,
            lead: self.lead,
        }
    }
}

fn is_inline(tag: &Tag<'_>) -> bool {
    matches!(
        tag,
        Tag::Link { .. } | Tag::Emphasis | Tag::Strong | Tag::Strikethrough
    )
}

fn is_inline_end(tag: &TagEnd) -> bool {
    matches!(
        tag,
        TagEnd::Link | TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough
    )
}

pub fn parse_list(markdown: &str) -> Result<Vec<ListItem>, AppError> {
    let parser = Parser::new_ext(markdown, Options::ENABLE_TASKLISTS);
    let mut events = parser.into_offset_iter();

    match events.next() {
        Some((Event::Start(Tag::List(_)), _)) => {}
        _ => return Err(AppError::invalid_data("content does not start with a list")),
    }

    let mut items = Vec::new();
    let mut list_depth = 1usize;
    let mut item_depth = 0usize;
    let mut current: Option<ItemBuilder> = None;

    for (event, range) in events {
        match event {
            Event::Start(Tag::Item) => {
                item_depth += 1;
                if item_depth == 1 {
                    current = Some(ItemBuilder::new(range));
                }
            }
            Event::End(TagEnd::Item) => {
                item_depth = item_depth.saturating_sub(1);
                if item_depth == 0
                    && let Some(item) = current.take()
                {
                    items.push(item.finish(markdown));
                }
            }
            Event::Start(Tag::List(_)) => {
                list_depth += 1;
                if let Some(item) = current.as_mut() {
                    item.boundary();
                }
            }
            Event::End(TagEnd::List(_)) => {
                list_depth -= 1;
                if list_depth == 0 {
                    break;
                }
            }
            _ if item_depth != 1 => {}
            Event::TaskListMarker(checked) => {
                if let Some(item) = current.as_mut() {
                    item.checked = Some(checked);
                }
            }
            Event::Text(text) => {
                if let Some(item) = current.as_mut() {
                    item.push_text(&text);
                }
            }
            Event::Code(code) => {
                if let Some(item) = current.as_mut() {
                    item.push_code(&code);
                }
            }
            Event::Start(tag) if is_inline(&tag) => {
                if let Some(item) = current.as_mut() {
                    item.open_inline();
                }
            }
            Event::End(tag) if is_inline_end(&tag) => {
                if let Some(item) = current.as_mut() {
                    item.close_inline();
                }
            }
            Event::SoftBreak | Event::HardBreak | Event::Start(_) | Event::End(_) => {
                if let Some(item) = current.as_mut() {
                    item.boundary();
                }
            }
            _ => {}
        }
    }

    Ok(items)
}

fn item_text(raw: &str, has_checkbox: bool) -> String {
    let raw = raw.trim_end();
    let mut lines = raw.split('\n');
    let first = lines.next().unwrap_or_default();

    let (first, width) = match MARKER_RE.find(first) {
        Some(marker) => (&first[marker.end()..], marker.end()),
        None => (first, 0),
    };
    let first = if has_checkbox {
        CHECKBOX_RE
            .find(first)
            .map(|checkbox| &first[checkbox.end()..])
            .unwrap_or(first)
    } else {
        first
    };

    let mut text = first.trim_end_matches('\r').to_string();
    for line in lines {
        text.push('\n');
        text.push_str(dedent(line.trim_end_matches('\r'), width));
    }
    text
}

fn dedent(line: &str, width: usize) -> &str {
    let indent = line
        .bytes()
        .take(width)
        .take_while(|byte| *byte == b' ')
        .count();
    &line[indent..]
}

#[cfg(test)]
mod tests {
    use super::{ListItem, parse_list};

    #[test]
    fn rejects_content_without_leading_list() {
        assert!(parse_list("").is_err());
        assert!(parse_list("paragraph first\n\n- item").is_err());
    }

    #[test]
    fn reads_task_list_markers() {
        let items = parse_list("- [x] Done thing\n- [ ] Not done\n- plain").unwrap();

        assert_eq!(
            items,
            vec![
                ListItem {
                    text: "Done thing".to_string(),
                    checked: Some(true),
                    lead: "Done thing".to_string(),
                },
                ListItem {
                    text: "Not done".to_string(),
                    checked: Some(false),
                    lead: "Not done".to_string(),
                },
                ListItem {
                    text: "plain".to_string(),
                    checked: None,
                    lead: "plain".to_string(),
                },
            ]
        );
    }

    #[test]
    fn lead_is_link_text_when_item_starts_with_link() {
        let items = parse_list("- [blocks task-2](task-2.md)\n- [task-3](task-3.md) extra").unwrap();

        assert_eq!(items[0].lead, "blocks task-2");
        assert_eq!(items[1].lead, "task-3");
        assert_eq!(items[1].text, "[task-3](task-3.md) extra");
    }

    #[test]
    fn lead_stops_at_line_break_and_inline_markup() {
        let items = parse_list("- first line\n  second line\n- plain *emph* tail").unwrap();

        assert_eq!(items[0].lead, "first line");
        assert_eq!(items[0].text, "first line\nsecond line");
        assert_eq!(items[1].lead, "plain ");
    }

    #[test]
    fn continuation_lines_are_dedented() {
        let markdown = "- author: alice\n  date: 2021-01-01\n  line one\n\n  line two\n- next";
        let items = parse_list(markdown).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(
            items[0].text,
            "author: alice\ndate: 2021-01-01\nline one\n\nline two"
        );
        assert_eq!(items[1].text, "next");
    }

    #[test]
    fn nested_lists_stay_in_parent_item() {
        let items = parse_list("- parent\n  - [x] child\n- sibling").unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].checked, None);
        assert_eq!(items[0].text, "parent\n- [x] child");
        assert_eq!(items[0].lead, "parent");
    }

    #[test]
    fn only_the_first_list_is_read() {
        let items = parse_list("1. one\n2. two\n\nbreak\n\n- other").unwrap();
        let texts: Vec<&str> = items.iter().map(|item| item.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two"]);
    }
}
