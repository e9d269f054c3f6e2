//! Waitlist domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use atmos_core::{Email, WaitlistEntryId, WaitlistStatus};

/// A waitlist signup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WaitlistEntry {
    pub id: WaitlistEntryId,
    pub email: Email,
    pub name: String,
    /// Where the signup came from, `website` unless the form said otherwise.
    pub source: String,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
    pub status: WaitlistStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
