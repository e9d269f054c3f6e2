//! The Atmos product catalog.
//!
//! There is a single product sold in four finishes. What a customer pays
//! per unit depends only on the payment option; the shipping country is
//! recorded on the line but does not change the price.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::OrderType;

/// Errors parsing catalog identifiers from user input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("unknown color: {0}")]
    UnknownColor(String),
    #[error("unknown country: {0}")]
    UnknownCountry(String),
    #[error("unknown payment option: {0}")]
    UnknownPaymentOption(String),
}

/// Product finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Color {
    #[default]
    BlushChrome,
    BlackMist,
    IceChrome,
    RoseGold,
}

impl Color {
    /// All finishes in display order.
    pub const ALL: [Self; 4] = [
        Self::BlushChrome,
        Self::BlackMist,
        Self::IceChrome,
        Self::RoseGold,
    ];

    /// Stable identifier used in forms and cart line ids.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::BlushChrome => "blush-chrome",
            Self::BlackMist => "black-mist",
            Self::IceChrome => "ice-chrome",
            Self::RoseGold => "rose-gold",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::BlushChrome => "Blush Chrome",
            Self::BlackMist => "Black Mist",
            Self::IceChrome => "Ice Chrome",
            Self::RoseGold => "Rose Gold",
        }
    }

    /// Product shot for this finish, relative to the static root.
    #[must_use]
    pub const fn image_path(self) -> &'static str {
        match self {
            Self::BlushChrome => "/static/images/blush-chrome.svg",
            Self::BlackMist => "/static/images/obsidian-mist.svg",
            Self::IceChrome => "/static/images/ice-chrome.svg",
            Self::RoseGold => "/static/images/rose-gold.svg",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Color {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.slug() == s)
            .ok_or_else(|| CatalogError::UnknownColor(s.to_owned()))
    }
}

/// How the customer pays for each unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentOption {
    /// Pay the full price now.
    Full,
    /// Refundable reservation deposit.
    #[default]
    Deposit,
}

impl PaymentOption {
    pub const ALL: [Self; 2] = [Self::Full, Self::Deposit];

    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Deposit => "deposit",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Full => "Full Payment",
            Self::Deposit => "Deposit",
        }
    }

    /// Price charged per unit, in USD.
    #[must_use]
    pub const fn unit_price(self) -> Decimal {
        match self {
            Self::Full => Decimal::from_parts(600, 0, 0, false, 0),
            Self::Deposit => Decimal::from_parts(50, 0, 0, false, 0),
        }
    }

    /// Fulfilment category recorded on the order line.
    #[must_use]
    pub const fn order_type(self) -> OrderType {
        match self {
            Self::Full => OrderType::FullPrice,
            Self::Deposit => OrderType::Preorder,
        }
    }
}

impl fmt::Display for PaymentOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for PaymentOption {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.slug() == s)
            .ok_or_else(|| CatalogError::UnknownPaymentOption(s.to_owned()))
    }
}

/// Whether orders to a country ship at launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Online,
    Soon,
}

/// A destination country from the configurator list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Country {
    pub code: &'static str,
    pub name: &'static str,
    pub availability: Availability,
}

macro_rules! countries {
    ($( $code:literal => $name:literal, $avail:ident; )*) => {
        /// Every country the configurator offers, in display order.
        pub const COUNTRIES: &[Country] = &[
            $( Country { code: $code, name: $name, availability: Availability::$avail }, )*
        ];
    };
}

countries! {
    "us" => "United States", Online;
    "ca" => "Canada", Online;
    "gb" => "United Kingdom", Online;
    "au" => "Australia", Soon;
    "fr" => "France", Soon;
    "de" => "Germany", Soon;
    "jp" => "Japan", Soon;
    "cn" => "China", Soon;
    "in" => "India", Soon;
    "br" => "Brazil", Soon;
    "mx" => "Mexico", Soon;
    "za" => "South Africa", Soon;
    "it" => "Italy", Soon;
    "es" => "Spain", Soon;
    "ru" => "Russia", Soon;
    "kr" => "South Korea", Soon;
    "se" => "Sweden", Soon;
    "no" => "Norway", Soon;
    "fi" => "Finland", Soon;
    "dk" => "Denmark", Soon;
    "nl" => "Netherlands", Soon;
    "ch" => "Switzerland", Soon;
    "be" => "Belgium", Soon;
    "at" => "Austria", Soon;
    "ie" => "Ireland", Soon;
    "nz" => "New Zealand", Soon;
    "sg" => "Singapore", Soon;
    "hk" => "Hong Kong", Soon;
    "ar" => "Argentina", Soon;
    "cl" => "Chile", Soon;
    "sa" => "Saudi Arabia", Soon;
    "ae" => "United Arab Emirates", Soon;
    "tr" => "Turkey", Soon;
    "pl" => "Poland", Soon;
    "cz" => "Czech Republic", Soon;
    "pt" => "Portugal", Soon;
    "gr" => "Greece", Soon;
    "hu" => "Hungary", Soon;
    "ml" => "Mali", Soon;
    "sn" => "Senegal", Soon;
    "gm" => "Gambia", Soon;
    "gw" => "Guinea-Bissau", Soon;
    "gn" => "Guinea", Soon;
    "sl" => "Sierra Leone", Soon;
    "lr" => "Liberia", Soon;
    "ci" => "Ivory Coast", Soon;
    "gh" => "Ghana", Soon;
}

/// Default country preselected in the configurator.
pub const DEFAULT_COUNTRY: &str = "us";

/// Look up a country by its lowercase code.
///
/// # Errors
///
/// Returns `CatalogError::UnknownCountry` if the code is not in [`COUNTRIES`].
pub fn country(code: &str) -> Result<&'static Country, CatalogError> {
    let code = code.trim().to_ascii_lowercase();
    COUNTRIES
        .iter()
        .find(|c| c.code == code)
        .ok_or(CatalogError::UnknownCountry(code))
}

/// Display name for a country code, falling back to the uppercased code.
#[must_use]
pub fn country_name(code: &str) -> String {
    country(code).map_or_else(|_| code.to_uppercase(), |c| c.name.to_owned())
}
