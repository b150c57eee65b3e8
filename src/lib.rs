//! Overdue - keep your TODOs honest
//!
//! Scans source files for annotated comments (TODO, FIXME, ...) which may carry an
//! expiry date, and reports the ones which are overdue.
//!
//! # Features
//!
//! - Configurable comment prefixes, tags and date layouts
//! - Free-form template placing the tag and the date in any order
//! - Parallel file scanning honouring .gitignore
//! - Strict mode requiring every annotation to carry an expiry date
//! - Output as plain text, a table or JSON
//!
//! # Example
//!
//! ```rust
//! use overdue::matcher::CompiledMatcher;
//! use overdue::models::ParsingConfig;
//!
//! let matcher = CompiledMatcher::compile(&ParsingConfig {
//!     comment_prefixes: vec!["//".to_string()],
//!     tags: vec!["TODO".to_string()],
//!     expiry_pattern: r"{tag}(?:\[{date}\])?".to_string(),
//!     date_layout: "YYYY-MM-DD".to_string(),
//!     case_sensitive: true,
//! })
//! .unwrap();
//!
//! let found = matcher.match_lines("// TODO[2099-01-01] finish later");
//! assert_eq!(found[0].content, "finish later");
//! ```

pub mod cli;
pub mod config;
pub mod enforcer;
pub mod error;
pub mod layout;
pub mod matcher;
pub mod models;
pub mod reporter;
pub mod scanner;

// Re-export commonly used types
pub use error::CompileError;
pub use matcher::CompiledMatcher;
pub use models::{Config, Finding, ParsedAnnotation, ParsingConfig, Report};
