//! Turns a [`ParsingConfig`] into a single regex and applies it line by line.

use crate::error::CompileError;
use crate::layout::DateLayout;
use crate::models::{ParsedAnnotation, ParsingConfig};
use regex::{Captures, Regex};

pub const TAG_PLACEHOLDER: &str = "{tag}";
pub const DATE_PLACEHOLDER: &str = "{date}";

const GROUP_ANNOTATION: &str = "annotation";
const GROUP_COMMENT: &str = "comment";
const GROUP_TAG: &str = "tag";
const GROUP_EXPIRY: &str = "expiry";
const GROUP_CONTENT: &str = "content";

/// Physical capture index of each logical role in the compiled pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ordering {
    pub annotation: usize,
    pub comment: usize,
    pub tag: usize,
    pub expiry: usize,
    pub content: usize,

    /// Whether `{tag}` comes before `{date}` in the template
    pub tag_first: bool,
}

impl Ordering {
    fn resolve(re: &Regex, tag_first: bool) -> Result<Self, CompileError> {
        let index_of = |name: &str| {
            re.capture_names()
                .position(|n| n == Some(name))
                .ok_or_else(|| {
                    CompileError::InvalidPattern(regex::Error::Syntax(format!(
                        "capture group {name:?} is missing from the pattern"
                    )))
                })
        };

        Ok(Self {
            annotation: index_of(GROUP_ANNOTATION)?,
            comment: index_of(GROUP_COMMENT)?,
            tag: index_of(GROUP_TAG)?,
            expiry: index_of(GROUP_EXPIRY)?,
            content: index_of(GROUP_CONTENT)?,
            tag_first,
        })
    }
}

/// A compiled annotation matcher. Immutable once built and safe to share across threads.
#[derive(Debug, Clone)]
pub struct CompiledMatcher {
    re: Regex,
    ordering: Ordering,
    layout: DateLayout,
}

impl CompiledMatcher {
    pub fn compile(config: &ParsingConfig) -> Result<Self, CompileError> {
        let template = config.expiry_pattern.as_str();
        let tag_at = find_placeholder(template, TAG_PLACEHOLDER)?;
        let date_at = find_placeholder(template, DATE_PLACEHOLDER)?;

        let comments = alternation(&config.comment_prefixes, "comment prefixes")?;
        let tags = alternation(&config.tags, "tags")?;
        let layout = DateLayout::parse(&config.date_layout)?;

        let substituted = template
            .replacen(TAG_PLACEHOLDER, &format!("(?P<{GROUP_TAG}>{tags})"), 1)
            .replacen(
                DATE_PLACEHOLDER,
                &format!("(?P<{GROUP_EXPIRY}>(?:{})?)", layout.pattern()),
                1,
            );

        let flags = if config.case_sensitive { "" } else { "(?i)" };
        let literal = format!(
            "{flags}(?P<{GROUP_ANNOTATION}>(?P<{GROUP_COMMENT}>{comments})[[:space:]]*{substituted}[[:space:]]*(?P<{GROUP_CONTENT}>.+)?)$"
        );
        tracing::debug!("using regex {:?} to parse comments", literal);

        let re = Regex::new(&literal)?;
        let ordering = Ordering::resolve(&re, tag_at < date_at)?;

        Ok(Self {
            re,
            ordering,
            layout,
        })
    }

    pub fn ordering(&self) -> Ordering {
        self.ordering
    }

    pub fn as_regex(&self) -> &Regex {
        &self.re
    }

    /// Extract every annotation from a file's content
    pub fn match_lines(&self, content: &str) -> Vec<ParsedAnnotation> {
        content
            .lines()
            .enumerate()
            .filter_map(|(idx, line)| self.match_line(idx + 1, line))
            .collect()
    }

    /// Match a single line. `None` when the line holds no annotation or its expiry date is invalid.
    pub fn match_line(&self, line_number: usize, line: &str) -> Option<ParsedAnnotation> {
        let captures = self.re.captures(line)?;
        tracing::trace!(
            "line {}: matched {:?}",
            line_number,
            self.group(&captures, self.ordering.annotation)
        );

        let expiry_text = self.group(&captures, self.ordering.expiry);
        let expiry = if expiry_text.is_empty() {
            None
        } else {
            match self.layout.parse_date(expiry_text) {
                Some(date) => Some(date),
                None => {
                    tracing::debug!(
                        "skipping line {}: {:?} is not a valid {} date",
                        line_number,
                        expiry_text,
                        self.layout.as_str()
                    );
                    return None;
                }
            }
        };

        Some(ParsedAnnotation {
            comment_prefix: self.group(&captures, self.ordering.comment).to_string(),
            tag: self.group(&captures, self.ordering.tag).to_string(),
            content: self.group(&captures, self.ordering.content).to_string(),
            expiry,
            line_number,
            original_line: line.trim().to_string(),
        })
    }

    fn group<'h>(&self, captures: &Captures<'h>, index: usize) -> &'h str {
        captures.get(index).map(|m| m.as_str()).unwrap_or_default()
    }
}

fn find_placeholder(template: &str, placeholder: &'static str) -> Result<usize, CompileError> {
    let mut found = template.match_indices(placeholder).map(|(idx, _)| idx);
    let first = found
        .next()
        .ok_or(CompileError::MissingPlaceholder(placeholder))?;
    if found.next().is_some() {
        return Err(CompileError::DuplicatePlaceholder(placeholder));
    }
    Ok(first)
}

fn alternation(items: &[String], what: &'static str) -> Result<String, CompileError> {
    if items.is_empty() {
        return Err(CompileError::EmptyList(what));
    }
    Ok(items
        .iter()
        .map(|item| regex::escape(item))
        .collect::<Vec<_>>()
        .join("|"))
}
