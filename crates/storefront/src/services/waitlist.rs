//! Waitlist signup service.
//!
//! Order of checks for a submission: input validation (done by the caller
//! via [`WaitlistSubmission::validate`]), the per-session attempt window,
//! then the existing-entry lookup. An unsubscribed email is reactivated; any
//! other existing entry is reported as already subscribed.
//!
//! [`WaitlistSubmission::validate`]: atmos_core::WaitlistSubmission::validate

use std::future::Future;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use thiserror::Error;

use atmos_core::{
    AttemptWindow, Email, RateLimitPolicy, RateLimited, WaitlistInputError, WaitlistSignup,
    WaitlistStats,
};

use crate::db::{RepositoryError, WaitlistRepository};
use crate::models::WaitlistEntry;

/// Message shown for duplicate signups.
pub const ALREADY_REGISTERED: &str = "Email already registered for waitlist";

/// Errors from waitlist operations.
#[derive(Debug, Error)]
pub enum WaitlistError {
    #[error(transparent)]
    Input(#[from] WaitlistInputError),

    #[error(transparent)]
    RateLimited(#[from] RateLimited),

    #[error("email already registered for waitlist")]
    AlreadySubscribed,

    #[error("email not on waitlist")]
    NotFound,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl WaitlistError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Input(_) => StatusCode::BAD_REQUEST,
            Self::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::AlreadySubscribed => StatusCode::CONFLICT,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show the visitor.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Input(WaitlistInputError::BotDetected) => "Bot detected".to_owned(),
            Self::Input(WaitlistInputError::InvalidName) => {
                "Name must be between 2 and 100 characters".to_owned()
            }
            Self::Input(WaitlistInputError::InvalidEmail(_)) => {
                "Please enter a valid email address".to_owned()
            }
            Self::RateLimited(limited) => format!(
                "Too many attempts. Please wait {} minutes before trying again.",
                limited.retry_after_minutes()
            ),
            Self::AlreadySubscribed => ALREADY_REGISTERED.to_owned(),
            Self::NotFound => "Email not found on waitlist".to_owned(),
            Self::Repository(_) => "Failed to join waitlist. Please try again.".to_owned(),
        }
    }
}

/// Storage operations the waitlist needs.
pub trait WaitlistStore: Send + Sync {
    fn find_by_email(
        &self,
        email: &Email,
    ) -> impl Future<Output = Result<Option<WaitlistEntry>, RepositoryError>> + Send;

    /// Insert an active entry. A duplicate email is `RepositoryError::Conflict`.
    fn insert(
        &self,
        signup: &WaitlistSignup,
        user_agent: Option<&str>,
    ) -> impl Future<Output = Result<WaitlistEntry, RepositoryError>> + Send;

    fn reactivate(
        &self,
        email: &Email,
        source: &str,
        referrer: Option<&str>,
    ) -> impl Future<Output = Result<WaitlistEntry, RepositoryError>> + Send;

    fn unsubscribe(&self, email: &Email)
    -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    fn count_active(&self) -> impl Future<Output = Result<i64, RepositoryError>> + Send;

    fn stats(&self) -> impl Future<Output = Result<WaitlistStats, RepositoryError>> + Send;
}

impl WaitlistStore for WaitlistRepository<'_> {
    async fn find_by_email(&self, email: &Email) -> Result<Option<WaitlistEntry>, RepositoryError> {
        self.get_by_email(email).await
    }

    async fn insert(
        &self,
        signup: &WaitlistSignup,
        user_agent: Option<&str>,
    ) -> Result<WaitlistEntry, RepositoryError> {
        self.create(signup, user_agent).await
    }

    async fn reactivate(
        &self,
        email: &Email,
        source: &str,
        referrer: Option<&str>,
    ) -> Result<WaitlistEntry, RepositoryError> {
        Self::reactivate(self, email, source, referrer).await
    }

    async fn unsubscribe(&self, email: &Email) -> Result<bool, RepositoryError> {
        Self::unsubscribe(self, email).await
    }

    async fn count_active(&self) -> Result<i64, RepositoryError> {
        Self::count_active(self).await
    }

    async fn stats(&self) -> Result<WaitlistStats, RepositoryError> {
        Self::stats(self).await
    }
}

/// Waitlist business logic over a [`WaitlistStore`].
pub struct WaitlistService<S> {
    store: S,
    policy: RateLimitPolicy,
}

impl<S: WaitlistStore> WaitlistService<S> {
    #[must_use]
    pub const fn new(store: S, policy: RateLimitPolicy) -> Self {
        Self { store, policy }
    }

    /// Record an attempt against `attempts`, then add or reactivate the entry.
    ///
    /// `attempts` is the caller's stored window; it is updated in place when
    /// the attempt is allowed and left alone when it is refused.
    ///
    /// # Errors
    ///
    /// - `WaitlistError::RateLimited` when the window is full
    /// - `WaitlistError::AlreadySubscribed` when the email is already listed
    /// - `WaitlistError::Repository` on storage failure
    pub async fn submit(
        &self,
        signup: &WaitlistSignup,
        user_agent: Option<&str>,
        attempts: &mut Option<AttemptWindow>,
        now: DateTime<Utc>,
    ) -> Result<WaitlistEntry, WaitlistError> {
        *attempts = Some(AttemptWindow::register(*attempts, now, &self.policy)?);

        if let Some(existing) = self.store.find_by_email(&signup.email).await? {
            if !existing.status.can_resubscribe() {
                return Err(WaitlistError::AlreadySubscribed);
            }
            let entry = self
                .store
                .reactivate(&signup.email, &signup.source, signup.referrer.as_deref())
                .await
                .map_err(|e| match e {
                    // Reactivated by a concurrent request in between
                    RepositoryError::NotFound => WaitlistError::AlreadySubscribed,
                    other => WaitlistError::Repository(other),
                })?;
            tracing::info!(entry_id = %entry.id, "waitlist entry reactivated");
            return Ok(entry);
        }

        let entry = self
            .store
            .insert(signup, user_agent)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => WaitlistError::AlreadySubscribed,
                other => WaitlistError::Repository(other),
            })?;
        tracing::info!(entry_id = %entry.id, source = %entry.source, "waitlist entry created");
        Ok(entry)
    }

    /// Mark an email as unsubscribed.
    ///
    /// # Errors
    ///
    /// Returns `WaitlistError::NotFound` if the email is not listed.
    pub async fn unsubscribe(&self, email: &Email) -> Result<(), WaitlistError> {
        if self.store.unsubscribe(email).await? {
            Ok(())
        } else {
            Err(WaitlistError::NotFound)
        }
    }

    /// Number of active entries.
    ///
    /// # Errors
    ///
    /// Returns `WaitlistError::Repository` on storage failure.
    pub async fn count(&self) -> Result<i64, WaitlistError> {
        Ok(self.store.count_active().await?)
    }

    /// Aggregate statistics.
    ///
    /// # Errors
    ///
    /// Returns `WaitlistError::Repository` on storage failure.
    pub async fn stats(&self) -> Result<WaitlistStats, WaitlistError> {
        Ok(self.store.stats().await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use atmos_core::waitlist::SourceCount;
    use atmos_core::{WaitlistEntryId, WaitlistStatus, WaitlistSubmission};
    use chrono::TimeDelta;

    use super::*;

    /// In-memory store mirroring the unique-email constraint.
    #[derive(Default)]
    pub struct MemoryWaitlistStore {
        entries: Mutex<Vec<WaitlistEntry>>,
    }

    impl MemoryWaitlistStore {
        pub fn with_entry(email: &str, status: WaitlistStatus) -> Self {
            let store = Self::default();
            let now = Utc::now();
            store.entries.lock().unwrap().push(WaitlistEntry {
                id: WaitlistEntryId::new(1),
                email: Email::parse(email).unwrap(),
                name: "Existing".to_owned(),
                source: "website".to_owned(),
                referrer: None,
                user_agent: None,
                status,
                created_at: now,
                updated_at: now,
            });
            store
        }

        pub fn len(&self) -> usize {
            self.entries.lock().unwrap().len()
        }
    }

    impl WaitlistStore for MemoryWaitlistStore {
        async fn find_by_email(
            &self,
            email: &Email,
        ) -> Result<Option<WaitlistEntry>, RepositoryError> {
            Ok(self
                .entries
                .lock()
                .unwrap()
                .iter()
                .find(|e| &e.email == email)
                .cloned())
        }

        async fn insert(
            &self,
            signup: &WaitlistSignup,
            user_agent: Option<&str>,
        ) -> Result<WaitlistEntry, RepositoryError> {
            let mut entries = self.entries.lock().unwrap();
            if entries.iter().any(|e| e.email == signup.email) {
                return Err(RepositoryError::Conflict("email".to_owned()));
            }
            let now = Utc::now();
            let entry = WaitlistEntry {
                id: WaitlistEntryId::new(i64::try_from(entries.len()).unwrap() + 1),
                email: signup.email.clone(),
                name: signup.name.clone(),
                source: signup.source.clone(),
                referrer: signup.referrer.clone(),
                user_agent: user_agent.map(str::to_owned),
                status: WaitlistStatus::Active,
                created_at: now,
                updated_at: now,
            };
            entries.push(entry.clone());
            Ok(entry)
        }

        async fn reactivate(
            &self,
            email: &Email,
            source: &str,
            referrer: Option<&str>,
        ) -> Result<WaitlistEntry, RepositoryError> {
            let mut entries = self.entries.lock().unwrap();
            let entry = entries
                .iter_mut()
                .find(|e| &e.email == email && e.status == WaitlistStatus::Unsubscribed)
                .ok_or(RepositoryError::NotFound)?;
            entry.status = WaitlistStatus::Active;
            source.clone_into(&mut entry.source);
            entry.referrer = referrer.map(str::to_owned);
            entry.updated_at = Utc::now();
            Ok(entry.clone())
        }

        async fn unsubscribe(&self, email: &Email) -> Result<bool, RepositoryError> {
            let mut entries = self.entries.lock().unwrap();
            Ok(entries
                .iter_mut()
                .find(|e| &e.email == email)
                .map(|e| e.status = WaitlistStatus::Unsubscribed)
                .is_some())
        }

        async fn count_active(&self) -> Result<i64, RepositoryError> {
            let entries = self.entries.lock().unwrap();
            Ok(i64::try_from(entries.iter().filter(|e| e.status == WaitlistStatus::Active).count()).unwrap())
        }

        async fn stats(&self) -> Result<WaitlistStats, RepositoryError> {
            let entries = self.entries.lock().unwrap();
            let active: Vec<_> = entries.iter().filter(|e| e.status == WaitlistStatus::Active).collect();
            let total = i64::try_from(active.len()).unwrap();
            let sources = vec![SourceCount {
                source: "website".to_owned(),
                count: total,
            }];
            Ok(WaitlistStats::new(total, total, 0, sources))
        }
    }

    fn signup(email: &str) -> WaitlistSignup {
        WaitlistSubmission {
            name: "Ada Lovelace".to_owned(),
            email: email.to_owned(),
            ..Default::default()
        }
        .validate()
        .unwrap()
    }

    fn generous() -> RateLimitPolicy {
        RateLimitPolicy {
            max_attempts: 100,
            window: Duration::from_secs(60),
        }
    }

    #[tokio::test]
    async fn test_new_signup_is_inserted() {
        let service = WaitlistService::new(MemoryWaitlistStore::default(), generous());
        let mut attempts = None;
        let entry = service
            .submit(&signup("ada@example.com"), Some("test-agent"), &mut attempts, Utc::now())
            .await
            .unwrap();
        assert_eq!(entry.status, WaitlistStatus::Active);
        assert_eq!(entry.user_agent.as_deref(), Some("test-agent"));
        assert_eq!(attempts.unwrap().count, 1);
        assert_eq!(service.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_active_email_is_rejected() {
        let store = MemoryWaitlistStore::with_entry("ada@example.com", WaitlistStatus::Active);
        let service = WaitlistService::new(store, generous());
        let err = service
            .submit(&signup("ada@example.com"), None, &mut None, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, WaitlistError::AlreadySubscribed));
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.public_message(), ALREADY_REGISTERED);
    }

    #[tokio::test]
    async fn test_notified_email_is_rejected() {
        let store = MemoryWaitlistStore::with_entry("ada@example.com", WaitlistStatus::Notified);
        let service = WaitlistService::new(store, generous());
        assert!(matches!(
            service
                .submit(&signup("ada@example.com"), None, &mut None, Utc::now())
                .await,
            Err(WaitlistError::AlreadySubscribed)
        ));
    }

    #[tokio::test]
    async fn test_unsubscribed_email_is_reactivated_not_duplicated() {
        let store =
            MemoryWaitlistStore::with_entry("ada@example.com", WaitlistStatus::Unsubscribed);
        let service = WaitlistService::new(store, generous());
        let mut form = WaitlistSubmission {
            name: "Ada Lovelace".to_owned(),
            email: "ada@example.com".to_owned(),
            source: Some("instagram".to_owned()),
            ..Default::default()
        };
        form.referrer = Some("https://instagram.com".to_owned());
        let entry = service
            .submit(&form.validate().unwrap(), None, &mut None, Utc::now())
            .await
            .unwrap();

        assert_eq!(entry.id, WaitlistEntryId::new(1));
        assert_eq!(entry.status, WaitlistStatus::Active);
        assert_eq!(entry.source, "instagram");
        assert_eq!(entry.referrer.as_deref(), Some("https://instagram.com"));
        assert_eq!(service.store.len(), 1);
    }

    #[tokio::test]
    async fn test_rate_limit_blocks_until_window_elapses() {
        let service =
            WaitlistService::new(MemoryWaitlistStore::default(), RateLimitPolicy::WAITLIST);
        let t0 = Utc::now();
        let mut attempts = None;

        for i in 0..3 {
            service
                .submit(&signup(&format!("user{i}@example.com")), None, &mut attempts, t0)
                .await
                .unwrap();
        }

        let err = service
            .submit(&signup("user9@example.com"), None, &mut attempts, t0)
            .await
            .unwrap_err();
        assert!(matches!(err, WaitlistError::RateLimited(_)));
        assert_eq!(err.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            err.public_message(),
            "Too many attempts. Please wait 5 minutes before trying again."
        );
        assert_eq!(attempts.unwrap().count, 3);
        assert_eq!(service.store.len(), 3);

        let later = t0 + TimeDelta::minutes(5) + TimeDelta::seconds(1);
        service
            .submit(&signup("user9@example.com"), None, &mut attempts, later)
            .await
            .unwrap();
        assert_eq!(attempts.unwrap().count, 1);
    }

    #[tokio::test]
    async fn test_unsubscribe() {
        let store = MemoryWaitlistStore::with_entry("ada@example.com", WaitlistStatus::Active);
        let service = WaitlistService::new(store, generous());
        let email = Email::parse("ada@example.com").unwrap();
        service.unsubscribe(&email).await.unwrap();
        assert_eq!(service.count().await.unwrap(), 0);

        let missing = Email::parse("nobody@example.com").unwrap();
        assert!(matches!(
            service.unsubscribe(&missing).await,
            Err(WaitlistError::NotFound)
        ));
    }

    #[test]
    fn test_input_error_messages() {
        let err = WaitlistError::from(WaitlistInputError::BotDetected);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), "Bot detected");
    }
}
