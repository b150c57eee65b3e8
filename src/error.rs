//! Error types for building a matcher

use thiserror::Error;

/// Why a parsing configuration could not be turned into a matcher
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("expiry pattern must contain {0}")]
    MissingPlaceholder(&'static str),

    #[error("expiry pattern must contain {0} only once")]
    DuplicatePlaceholder(&'static str),

    #[error("unsupported character {0:?} in the date layout")]
    UnsupportedLayoutCharacter(char),

    #[error("at least one {0} must be configured")]
    EmptyList(&'static str),

    #[error("invalid matching pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}
