//! Waitlist signup validation and statistics.

use serde::{Deserialize, Serialize};

use crate::types::{Email, EmailError};

/// Minimum name length, in characters.
pub const NAME_MIN_CHARS: usize = 2;
/// Maximum name length, in characters.
pub const NAME_MAX_CHARS: usize = 100;
/// Source recorded when the form does not say where the signup came from.
pub const DEFAULT_SOURCE: &str = "website";

const SOURCE_MAX_CHARS: usize = 100;
const REFERRER_MAX_CHARS: usize = 500;

/// Reasons a signup form is rejected before touching storage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WaitlistInputError {
    /// The hidden honeypot field was filled in.
    #[error("bot detected")]
    BotDetected,
    #[error("name must be between {NAME_MIN_CHARS} and {NAME_MAX_CHARS} characters")]
    InvalidName,
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),
}

/// Raw signup form as submitted by the browser.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WaitlistSubmission {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub source: Option<String>,
    pub referrer: Option<String>,
    /// Honeypot. Hidden from humans, so any value means a bot.
    pub website: Option<String>,
}

/// A signup that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitlistSignup {
    pub name: String,
    pub email: Email,
    pub source: String,
    pub referrer: Option<String>,
}

impl WaitlistSubmission {
    /// Check the honeypot, then clean and validate the name and email.
    ///
    /// # Errors
    ///
    /// Returns the first [`WaitlistInputError`] encountered.
    pub fn validate(&self) -> Result<WaitlistSignup, WaitlistInputError> {
        if self
            .website
            .as_deref()
            .is_some_and(|value| !value.trim().is_empty())
        {
            return Err(WaitlistInputError::BotDetected);
        }

        let name = collapse_whitespace(&self.name);
        let name_len = name.chars().count();
        if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&name_len) {
            return Err(WaitlistInputError::InvalidName);
        }

        let email = Email::normalize(&self.email)?;

        let source = non_blank(self.source.as_deref(), SOURCE_MAX_CHARS)
            .unwrap_or_else(|| DEFAULT_SOURCE.to_owned());
        let referrer = non_blank(self.referrer.as_deref(), REFERRER_MAX_CHARS);

        Ok(WaitlistSignup {
            name,
            email,
            source,
            referrer,
        })
    }
}

/// Trim and squeeze internal runs of whitespace to a single space.
#[must_use]
pub fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn non_blank(value: Option<&str>, max_chars: usize) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| v.chars().take(max_chars).collect())
}

/// Signups per source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCount {
    pub source: String,
    pub count: i64,
}

/// Aggregate view of the waitlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct WaitlistStats {
    /// Active entries.
    pub total_count: i64,
    /// Active entries created in the last 24 hours.
    pub recent_count: i64,
    /// `recent_count` as a percentage of `total_count`.
    pub growth_rate: f64,
    /// Up to five most common sources among active entries.
    pub top_sources: Vec<SourceCount>,
    pub converted_count: i64,
}

/// How many sources [`WaitlistStats::top_sources`] keeps.
pub const TOP_SOURCES_LIMIT: usize = 5;

impl WaitlistStats {
    /// Build stats from raw counts, deriving the growth rate.
    #[must_use]
    pub fn new(
        total_count: i64,
        recent_count: i64,
        converted_count: i64,
        mut top_sources: Vec<SourceCount>,
    ) -> Self {
        top_sources.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.source.cmp(&b.source)));
        top_sources.truncate(TOP_SOURCES_LIMIT);
        Self {
            total_count,
            recent_count,
            growth_rate: growth_rate(recent_count, total_count),
            top_sources,
            converted_count,
        }
    }
}

/// Percentage of `total` that is `recent`; zero when there is no total.
#[must_use]
#[allow(clippy::cast_precision_loss)] // waitlist counts stay far below 2^52
pub fn growth_rate(recent: i64, total: i64) -> f64 {
    if total > 0 {
        recent as f64 / total as f64 * 100.0
    } else {
        0.0
    }
}
