//! Business logic services for storefront.
//!
//! # Services
//!
//! - `stripe` - Stripe payment intent client
//! - `checkout` - Payment intent creation and order recording
//! - `waitlist` - Waitlist signup, reactivation and statistics
//! - `waitlist_cache` - Short-lived cache for public waitlist figures

pub mod checkout;
pub mod stripe;
pub mod waitlist;
pub mod waitlist_cache;

pub use checkout::{CheckoutError, CheckoutService};
pub use stripe::{StripeClient, StripeError};
pub use waitlist::{WaitlistError, WaitlistService};
pub use waitlist_cache::WaitlistCache;
