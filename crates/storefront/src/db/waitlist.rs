//! Waitlist repository for database operations.
//!
//! Queries are checked at runtime (`query_as` with `FromRow` rows) so the
//! crate builds without a live database.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use atmos_core::waitlist::{SourceCount, WaitlistSignup, WaitlistStats};
use atmos_core::{Email, WaitlistEntryId, WaitlistStatus};

use super::RepositoryError;
use crate::models::WaitlistEntry;

const ENTRY_COLUMNS: &str =
    "id, email, name, source, referrer, user_agent, status, created_at, updated_at";

/// Raw `storefront.waitlist` row.
#[derive(Debug, sqlx::FromRow)]
struct WaitlistRow {
    id: i64,
    email: String,
    name: String,
    source: String,
    referrer: Option<String>,
    user_agent: Option<String>,
    status: WaitlistStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<WaitlistRow> for WaitlistEntry {
    type Error = RepositoryError;

    fn try_from(row: WaitlistRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: WaitlistEntryId::new(row.id),
            email,
            name: row.name,
            source: row.source,
            referrer: row.referrer,
            user_agent: row.user_agent,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Aggregates from the `storefront.waitlist_stats` view.
#[derive(Debug, sqlx::FromRow)]
struct StatsRow {
    total_count: i64,
    recent_count: i64,
    converted_count: i64,
}

/// Repository for waitlist database operations.
#[derive(Clone, Copy)]
pub struct WaitlistRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WaitlistRepository<'a> {
    /// Create a new waitlist repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an entry by email, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<WaitlistEntry>, RepositoryError> {
        let row = sqlx::query_as::<_, WaitlistRow>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM storefront.waitlist WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(WaitlistEntry::try_from).transpose()
    }

    /// Insert a new active entry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already present.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        signup: &WaitlistSignup,
        user_agent: Option<&str>,
    ) -> Result<WaitlistEntry, RepositoryError> {
        let row = sqlx::query_as::<_, WaitlistRow>(&format!(
            r"
            INSERT INTO storefront.waitlist (email, name, source, referrer, user_agent, status)
            VALUES ($1, $2, $3, $4, $5, 'active')
            RETURNING {ENTRY_COLUMNS}
            "
        ))
        .bind(signup.email.as_str())
        .bind(&signup.name)
        .bind(&signup.source)
        .bind(signup.referrer.as_deref())
        .bind(user_agent)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "email already on waitlist"))?;

        WaitlistEntry::try_from(row)
    }

    /// Reactivate an unsubscribed entry, refreshing its source and referrer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if there is no unsubscribed entry
    /// for this email.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn reactivate(
        &self,
        email: &Email,
        source: &str,
        referrer: Option<&str>,
    ) -> Result<WaitlistEntry, RepositoryError> {
        let row = sqlx::query_as::<_, WaitlistRow>(&format!(
            r"
            UPDATE storefront.waitlist
            SET status = 'active', source = $2, referrer = $3, updated_at = NOW()
            WHERE email = $1 AND status = 'unsubscribed'
            RETURNING {ENTRY_COLUMNS}
            "
        ))
        .bind(email.as_str())
        .bind(source)
        .bind(referrer)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        WaitlistEntry::try_from(row)
    }

    /// Mark an entry as unsubscribed.
    ///
    /// Returns `false` if no entry exists for this email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn unsubscribe(&self, email: &Email) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE storefront.waitlist
            SET status = 'unsubscribed', updated_at = NOW()
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Count active entries.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_active(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM storefront.waitlist WHERE status = 'active'",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }

    /// Aggregate statistics over the waitlist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn stats(&self) -> Result<WaitlistStats, RepositoryError> {
        let totals = sqlx::query_as::<_, StatsRow>(
            "SELECT total_count, recent_count, converted_count FROM storefront.waitlist_stats",
        )
        .fetch_one(self.pool)
        .await?;

        let sources = sqlx::query_as::<_, (String, i64)>(
            r"
            SELECT source, COUNT(*) AS count
            FROM storefront.waitlist
            WHERE status = 'active'
            GROUP BY source
            ORDER BY count DESC, source
            LIMIT 5
            ",
        )
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(|(source, count)| SourceCount { source, count })
        .collect();

        Ok(WaitlistStats::new(
            totals.total_count,
            totals.recent_count,
            totals.converted_count,
            sources,
        ))
    }

    /// List entries oldest first, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored email is invalid.
    pub async fn list(
        &self,
        status: Option<WaitlistStatus>,
    ) -> Result<Vec<WaitlistEntry>, RepositoryError> {
        let rows = sqlx::query_as::<_, WaitlistRow>(&format!(
            r"
            SELECT {ENTRY_COLUMNS}
            FROM storefront.waitlist
            WHERE $1::storefront.waitlist_status IS NULL OR status = $1
            ORDER BY created_at, id
            "
        ))
        .bind(status)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(WaitlistEntry::try_from).collect()
    }
}
