use crate::models::ParsedAnnotation;
use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;

/// Inputs of the expiry policy
#[derive(Debug, Clone, Copy)]
pub struct EnforcerConfig {
    /// Point in time annotations are checked against
    pub now: DateTime<Utc>,

    /// Fail annotations which carry no expiry date
    pub strict: bool,
}

/// Why an annotation failed the check
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("{tag} missing expiry date")]
    MissingExpiry { tag: String },

    #[error("{tag} now overdue for {}", format_overdue(*overdue_by))]
    Overdue { tag: String, overdue_by: Duration },
}

#[derive(Debug, Clone)]
pub struct Enforcer {
    config: EnforcerConfig,
}

impl Enforcer {
    pub fn new(config: EnforcerConfig) -> Self {
        Self { config }
    }

    pub fn check(&self, annotation: &ParsedAnnotation) -> Result<(), Violation> {
        let Some(expiry) = annotation.expiry else {
            if self.config.strict {
                return Err(Violation::MissingExpiry {
                    tag: annotation.tag.clone(),
                });
            }
            return Ok(());
        };

        // Expiry dates are taken as midnight UTC
        let expires_at = expiry.and_time(chrono::NaiveTime::MIN).and_utc();
        if self.config.now > expires_at {
            let overdue_by = (self.config.now - expires_at)
                .to_std()
                .unwrap_or_default();
            return Err(Violation::Overdue {
                tag: annotation.tag.clone(),
                overdue_by,
            });
        }

        Ok(())
    }
}

/// Human-readable overdue duration limited to its two largest units, e.g. "1year 2months"
fn format_overdue(duration: Duration) -> String {
    let whole_seconds = Duration::from_secs(duration.as_secs());
    humantime::format_duration(whole_seconds)
        .to_string()
        .split_whitespace()
        .take(2)
        .collect::<Vec<_>>()
        .join(" ")
}
