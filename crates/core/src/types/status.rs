//! Status enums for various entities.

use serde::{Deserialize, Serialize};

/// Lifecycle of a waitlist entry.
///
/// Only `Active` entries count towards the public waitlist total. An
/// `Unsubscribed` entry may be reactivated by signing up again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "storefront.waitlist_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum WaitlistStatus {
    #[default]
    Active,
    /// Launch notification has been sent.
    Notified,
    /// Signed up and later purchased.
    Converted,
    Unsubscribed,
}

impl WaitlistStatus {
    /// Whether a new signup for this email may reactivate the entry.
    #[must_use]
    pub const fn can_resubscribe(self) -> bool {
        matches!(self, Self::Unsubscribed)
    }
}

impl std::fmt::Display for WaitlistStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Notified => write!(f, "notified"),
            Self::Converted => write!(f, "converted"),
            Self::Unsubscribed => write!(f, "unsubscribed"),
        }
    }
}

impl std::str::FromStr for WaitlistStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "notified" => Ok(Self::Notified),
            "converted" => Ok(Self::Converted),
            "unsubscribed" => Ok(Self::Unsubscribed),
            _ => Err(format!("invalid waitlist status: {s}")),
        }
    }
}

/// How an order line is fulfilled.
///
/// Full payments ship with priority; deposits are preorders settled later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "storefront.order_type", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    FullPrice,
    Preorder,
}
