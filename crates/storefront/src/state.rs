//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::db::{OrderRepository, WaitlistRepository};
use crate::services::{
    CheckoutService, StripeClient, StripeError, WaitlistCache, WaitlistService,
};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    stripe: StripeClient,
    waitlist_cache: WaitlistCache,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the Stripe client cannot be built from the
    /// configured secret key.
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Result<Self, StripeError> {
        let stripe = StripeClient::new(&config.stripe)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                stripe,
                waitlist_cache: WaitlistCache::default(),
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the Stripe API client.
    #[must_use]
    pub fn stripe(&self) -> &StripeClient {
        &self.inner.stripe
    }

    /// Cached public waitlist figures.
    #[must_use]
    pub fn waitlist_cache(&self) -> &WaitlistCache {
        &self.inner.waitlist_cache
    }

    /// Waitlist service backed by the database.
    #[must_use]
    pub fn waitlist(&self) -> WaitlistService<WaitlistRepository<'_>> {
        WaitlistService::new(
            WaitlistRepository::new(self.pool()),
            self.config().waitlist.rate_limit,
        )
    }

    /// Checkout service backed by Stripe and the database.
    #[must_use]
    pub fn checkout(&self) -> CheckoutService<StripeClient, OrderRepository<'_>> {
        CheckoutService::new(
            self.stripe().clone(),
            OrderRepository::new(self.pool()),
            self.config().stripe.currency,
        )
    }
}
