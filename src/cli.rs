use crate::models::Config;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "overdue")]
#[command(version, about = "Fail when annotated comments pass their expiry date", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Parser, Debug)]
pub enum Commands {
    /// Report annotations which are overdue (or lack an expiry date in strict mode)
    Check(ScanArgs),
    /// List every annotation along with its status
    List(ScanArgs),
    /// Write a configuration file with the default settings
    Init(InitArgs),
}

#[derive(Parser, Debug)]
pub struct ScanArgs {
    /// Files and directories to scan (defaults to the configured files)
    #[arg(env = "OVERDUE_FILES", value_delimiter = ',')]
    pub files: Vec<PathBuf>,

    /// Path to custom config file
    #[arg(short, long, env = "OVERDUE_CONFIG")]
    pub config: Option<PathBuf>,

    /// String opening a comment, e.g. "//" (repeatable)
    #[arg(long = "comment-prefix", env = "OVERDUE_COMMENT_PREFIXES", value_delimiter = ',')]
    pub comment_prefixes: Vec<String>,

    /// Annotation keyword, e.g. "TODO" (repeatable)
    #[arg(short, long = "tag", env = "OVERDUE_TAGS", value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Template matching tag and date together, using {tag} and {date} placeholders
    #[arg(long, env = "OVERDUE_EXPIRY_PATTERN")]
    pub expiry_pattern: Option<String>,

    /// Layout of expiry dates, e.g. "YYYY-MM-DD" or "02/01/2006"
    #[arg(long, env = "OVERDUE_DATE_LAYOUT")]
    pub date_layout: Option<String>,

    /// Match comment prefixes and tags regardless of case
    #[arg(long, env = "OVERDUE_CASE_INSENSITIVE")]
    pub case_insensitive: bool,

    /// Require every annotation to carry an expiry date
    #[arg(long, env = "OVERDUE_STRICT")]
    pub strict: bool,

    /// Do not descend into directories
    #[arg(long, env = "OVERDUE_NO_RECURSIVE")]
    pub no_recursive: bool,

    /// Regex; matching files and directories are skipped (repeatable)
    #[arg(short, long = "exclude", env = "OVERDUE_EXCLUDE_PATTERNS", value_delimiter = ',')]
    pub exclude_patterns: Vec<String>,

    /// Do not honour .gitignore files
    #[arg(long, env = "OVERDUE_NO_GITIGNORE")]
    pub no_gitignore: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", env = "OVERDUE_FORMAT")]
    pub format: OutputFormat,

    /// Output file (if not specified, writes to stdout)
    #[arg(short, long, env = "OVERDUE_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Log filter for diagnostics on stderr, e.g. "debug"
    #[arg(long, env = "OVERDUE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Enable verbose output
    #[arg(short, long, env = "OVERDUE_VERBOSE")]
    pub verbose: bool,
}

impl ScanArgs {
    /// Overlay command-line flags on top of a loaded config
    pub fn apply_to(&self, config: &mut Config) {
        if !self.files.is_empty() {
            config.files = self.files.clone();
        }
        if !self.comment_prefixes.is_empty() {
            config.comment_prefixes = self.comment_prefixes.clone();
        }
        if !self.tags.is_empty() {
            config.tags = self.tags.clone();
        }
        if let Some(ref pattern) = self.expiry_pattern {
            config.expiry_pattern = pattern.clone();
        }
        if let Some(ref layout) = self.date_layout {
            config.date_layout = layout.clone();
        }
        if self.case_insensitive {
            config.case_sensitive = false;
        }
        if self.strict {
            config.strict = true;
        }
        if self.no_recursive {
            config.recursive = false;
        }
        config
            .exclude_patterns
            .extend(self.exclude_patterns.iter().cloned());
        if self.no_gitignore {
            config.respect_gitignore = false;
        }
        if self.verbose {
            config.log_level = "debug".to_string();
        } else if let Some(ref level) = self.log_level {
            config.log_level = level.clone();
        }
    }
}

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Where to write the configuration
    #[arg(default_value = crate::config::CONFIG_FILE_NAME)]
    pub path: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One `file:line message` line per finding
    Text,
    /// Formatted table output for terminal
    Table,
    /// JSON format
    Json,
}
