//! Atmos Core - Shared domain library.
//!
//! This crate holds the domain model used by the Atmos components:
//! - `storefront` - Landing page, configurator, cart, checkout and waitlist
//! - `cli` - Command-line tools for migrations and waitlist management
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP clients. Cart arithmetic, signup validation and the
//! rate-limit window are all testable without a running server.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, and statuses
//! - [`catalog`] - Colors, payment options and shipping countries
//! - [`cart`] - Session cart keyed by product variant
//! - [`checkout`] - Customer details, idempotency keys, order snapshots
//! - [`waitlist`] - Signup validation and statistics
//! - [`rate_limit`] - Fixed-window attempt counter

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod rate_limit;
pub mod types;
pub mod waitlist;

pub use cart::{Cart, CartError, CartItem, NewCartItem};
pub use catalog::{CatalogError, Color, Country, PaymentOption};
pub use checkout::{Customer, CustomerInfo, CustomerInfoError, NewOrder, OrderLine};
pub use rate_limit::{AttemptWindow, RateLimitPolicy, RateLimited};
pub use types::*;
pub use waitlist::{WaitlistInputError, WaitlistSignup, WaitlistStats, WaitlistSubmission};
