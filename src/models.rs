use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Everything the matcher needs to recognise an annotated comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsingConfig {
    /// Strings that open a comment (`//`, `#`, ...)
    pub comment_prefixes: Vec<String>,

    /// Annotation keywords (`TODO`, `FIXME`, ...)
    pub tags: Vec<String>,

    /// Template holding one `{tag}` and one `{date}` placeholder, the rest is raw regex
    pub expiry_pattern: String,

    /// Layout of the expiry date, e.g. `YYYY-MM-DD`
    pub date_layout: String,

    /// Match comment prefixes and tags case sensitively
    pub case_sensitive: bool,
}

/// A single annotated comment found in a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedAnnotation {
    /// Comment prefix as written (`//`, `#`, ...)
    pub comment_prefix: String,

    /// Tag as written, original case preserved
    pub tag: String,

    /// Free text following the tag and expiry
    pub content: String,

    /// Expiry date, if one was written and it parsed
    pub expiry: Option<NaiveDate>,

    /// Line number where the annotation was found (1-indexed)
    pub line_number: usize,

    /// The source line, trimmed
    pub original_line: String,
}

/// An annotation tied to its file and the outcome of the policy check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub file: PathBuf,

    #[serde(flatten)]
    pub annotation: ParsedAnnotation,

    /// Why the annotation failed the check, `None` when it passed
    pub violation: Option<String>,
}

impl Finding {
    pub fn is_violation(&self) -> bool {
        self.violation.is_some()
    }
}

/// Complete result of a scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Paths that were scanned
    pub scan_paths: Vec<PathBuf>,

    /// Number of files handed to the matcher
    pub files_scanned: usize,

    /// Number of annotations found
    pub total_annotations: usize,

    /// Number of annotations that failed the check
    pub violation_count: usize,

    /// Count of annotations by tag
    pub by_tag: BTreeMap<String, usize>,

    /// All findings, ordered by file then line
    pub findings: Vec<Finding>,

    /// When the scan was performed
    pub scan_time: DateTime<Utc>,
}

impl Report {
    /// Create a new report from a collection of findings
    pub fn new(findings: Vec<Finding>, scan_paths: Vec<PathBuf>, files_scanned: usize) -> Self {
        let mut by_tag: BTreeMap<String, usize> = BTreeMap::new();
        for finding in &findings {
            *by_tag.entry(finding.annotation.tag.clone()).or_insert(0) += 1;
        }

        Self {
            scan_paths,
            files_scanned,
            total_annotations: findings.len(),
            violation_count: findings.iter().filter(|f| f.is_violation()).count(),
            by_tag,
            findings,
            scan_time: Utc::now(),
        }
    }

    /// Findings that failed the check
    pub fn violations(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.is_violation())
    }

    pub fn has_violations(&self) -> bool {
        self.violation_count > 0
    }
}

/// Configuration for overdue
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Strings which define what a comment looks like
    #[serde(default = "default_comment_prefixes")]
    pub comment_prefixes: Vec<String>,

    /// Annotation keywords to look for
    #[serde(default = "default_tags")]
    pub tags: Vec<String>,

    /// Template matching the tag and expiry date together
    #[serde(default = "default_expiry_pattern")]
    pub expiry_pattern: String,

    /// Layout of expiry dates
    #[serde(default = "default_date_layout")]
    pub date_layout: String,

    #[serde(default = "default_true")]
    pub case_sensitive: bool,

    /// Require every annotation to carry an expiry date
    #[serde(default)]
    pub strict: bool,

    /// Descend into directories
    #[serde(default = "default_true")]
    pub recursive: bool,

    /// Files and directories to scan when none are given on the command line
    #[serde(default = "default_files")]
    pub files: Vec<PathBuf>,

    /// Regexes; matching files and directories are skipped
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    /// Directory names never descended into
    #[serde(default = "default_ignored_dirs")]
    pub ignored_dirs: Vec<String>,

    /// Honour .gitignore and friends while walking
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,

    /// Default log filter, overridden by RUST_LOG
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            comment_prefixes: default_comment_prefixes(),
            tags: default_tags(),
            expiry_pattern: default_expiry_pattern(),
            date_layout: default_date_layout(),
            case_sensitive: true,
            strict: false,
            recursive: true,
            files: default_files(),
            exclude_patterns: Vec::new(),
            ignored_dirs: default_ignored_dirs(),
            respect_gitignore: true,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    pub fn parsing_config(&self) -> ParsingConfig {
        ParsingConfig {
            comment_prefixes: self.comment_prefixes.clone(),
            tags: self.tags.clone(),
            expiry_pattern: self.expiry_pattern.clone(),
            date_layout: self.date_layout.clone(),
            case_sensitive: self.case_sensitive,
        }
    }
}

fn default_comment_prefixes() -> Vec<String> {
    vec!["//".to_string(), "#".to_string(), "/*".to_string()]
}

fn default_tags() -> Vec<String> {
    vec!["TODO".to_string(), "FIXME".to_string()]
}

fn default_expiry_pattern() -> String {
    r"{tag}(?:\[{date}\])?".to_string()
}

fn default_date_layout() -> String {
    "YYYY-MM-DD".to_string()
}

fn default_files() -> Vec<PathBuf> {
    vec![PathBuf::from(".")]
}

fn default_ignored_dirs() -> Vec<String> {
    vec![
        ".git".to_string(),
        "node_modules".to_string(),
        "target".to_string(),
        "dist".to_string(),
        "build".to_string(),
        ".venv".to_string(),
        "venv".to_string(),
        "vendor".to_string(),
        "__pycache__".to_string(),
    ]
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotation(tag: &str, line_number: usize) -> ParsedAnnotation {
        ParsedAnnotation {
            comment_prefix: "//".to_string(),
            tag: tag.to_string(),
            content: "test".to_string(),
            expiry: None,
            line_number,
            original_line: format!("// {}: test", tag),
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.tags.contains(&"TODO".to_string()));
        assert!(config.tags.contains(&"FIXME".to_string()));
        assert!(config.case_sensitive);
        assert!(config.recursive);
        assert!(!config.strict);
        assert_eq!(config.date_layout, "YYYY-MM-DD");
        assert!(config.ignored_dirs.contains(&".git".to_string()));
    }

    #[test]
    fn test_parsing_config_projection() {
        let config = Config {
            case_sensitive: false,
            tags: vec!["HACK".to_string()],
            ..Config::default()
        };

        let parsing = config.parsing_config();
        assert_eq!(parsing.tags, vec!["HACK".to_string()]);
        assert_eq!(parsing.expiry_pattern, config.expiry_pattern);
        assert!(!parsing.case_sensitive);
    }

    #[test]
    fn test_report_creation() {
        let findings = vec![
            Finding {
                file: PathBuf::from("a.rs"),
                annotation: annotation("TODO", 1),
                violation: None,
            },
            Finding {
                file: PathBuf::from("a.rs"),
                annotation: annotation("TODO", 4),
                violation: Some("TODO missing expiry date".to_string()),
            },
            Finding {
                file: PathBuf::from("b.rs"),
                annotation: annotation("FIXME", 2),
                violation: None,
            },
        ];

        let report = Report::new(findings, vec![PathBuf::from(".")], 2);
        assert_eq!(report.total_annotations, 3);
        assert_eq!(report.violation_count, 1);
        assert!(report.has_violations());
        assert_eq!(report.by_tag.get("TODO"), Some(&2));
        assert_eq!(report.by_tag.get("FIXME"), Some(&1));
        assert_eq!(report.violations().next().unwrap().annotation.line_number, 4);
    }
}
