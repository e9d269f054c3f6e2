//! Domain models for storefront.
//!
//! These are validated domain objects, separate from the database row types
//! in [`crate::db`].

pub mod order;
pub mod waitlist;

pub use order::Order;
pub use waitlist::WaitlistEntry;
