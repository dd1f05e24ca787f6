use crate::error::AppError;
use once_cell::sync::Lazy;
use regex::Regex;

pub const RAW_SECTION: &str = "raw";

static HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(#{1,6}) (.+)$").expect("valid heading regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub heading: String,
    pub content: String,
}

impl Section {
    pub fn is_top_level(&self) -> bool {
        self.heading.starts_with("# ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sections {
    entries: Vec<(String, Section)>,
}

impl Sections {
    /// Inserts or replaces. A repeated title keeps its first position but
    /// takes the newer section.
    pub fn insert(&mut self, title: String, section: Section) -> Option<Section> {
        match self.entries.iter_mut().find(|(key, _)| *key == title) {
            Some((_, existing)) => Some(std::mem::replace(existing, section)),
            None => {
                self.entries.push((title, section));
                None
            }
        }
    }

    pub fn get(&self, title: &str) -> Option<&Section> {
        self.entries
            .iter()
            .find(|(key, _)| key == title)
            .map(|(_, section)| section)
    }

    pub fn remove(&mut self, title: &str) -> Option<Section> {
        let index = self.entries.iter().position(|(key, _)| key == title)?;
        Some(self.entries.remove(index).1)
    }

    pub fn contains(&self, title: &str) -> bool {
        self.get(title).is_some()
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Section)> {
        self.entries
            .iter()
            .map(|(key, section)| (key.as_str(), section))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

struct HeadingMatch<'a> {
    text: &'a str,
    title: &'a str,
    start: usize,
    end: usize,
}

pub fn parse_markdown(markdown: &str) -> Result<Sections, AppError> {
    if markdown.trim().is_empty() {
        return Err(AppError::invalid_input("markdown is empty"));
    }

    let mut headings: Vec<HeadingMatch<'_>> = Vec::new();
    if let Some(first) = HEADING_RE.find(markdown)
        && first.start() > 0
    {
        headings.push(HeadingMatch {
            text: "",
            title: RAW_SECTION,
            start: 0,
            end: 0,
        });
    }

    for captures in HEADING_RE.captures_iter(markdown) {
        let (Some(whole), Some(title)) = (captures.get(0), captures.get(2)) else {
            continue;
        };
        headings.push(HeadingMatch {
            text: whole.as_str().trim_end(),
            title: title.as_str().trim(),
            start: whole.start(),
            end: whole.end(),
        });
    }

    let mut sections = Sections::default();
    for (index, heading) in headings.iter().enumerate() {
        let stop = headings
            .get(index + 1)
            .map(|next| next.start)
            .unwrap_or(markdown.len());
        let content = markdown[heading.end..stop].trim().to_string();
        let replaced = sections.insert(
            heading.title.to_string(),
            Section {
                heading: heading.text.to_string(),
                content,
            },
        );
        if replaced.is_some() {
            log::warn!("duplicate heading '{}', keeping the last one", heading.title);
        }
    }

    log::debug!("found {} markdown sections", sections.len());
    Ok(sections)
}
