//! Shopping cart keyed by product variant.
//!
//! A cart line is identified by its variant key, the `(color, country,
//! payment_option)` tuple. Adding a variant that is already in the cart
//! increases that line's quantity instead of appending a second line.
//!
//! Invariant: every line has `quantity >= 1` and
//! `total_price == unit_price * quantity`. Setting a quantity to zero or
//! below removes the line.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::{self, CatalogError, Color, PaymentOption};

/// Largest quantity a single line may hold.
pub const MAX_LINE_QUANTITY: u32 = 99;

/// Errors from cart mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    #[error("quantity must be at least 1")]
    InvalidQuantity,
    #[error("a single line may hold at most {max} units")]
    QuantityTooLarge { max: u32 },
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Identity of a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariantKey {
    pub color: Color,
    pub country: String,
    pub payment_option: PaymentOption,
}

impl VariantKey {
    /// Line id derived from the key, e.g. `blush-chrome-us-deposit`.
    #[must_use]
    pub fn line_id(&self) -> String {
        format!("{}-{}-{}", self.color, self.country, self.payment_option)
    }
}

/// Request to put a variant in the cart.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCartItem {
    pub color: Color,
    pub country: String,
    pub payment_option: PaymentOption,
    pub quantity: u32,
}

/// A line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: String,
    pub color: Color,
    pub country: String,
    pub payment_option: PaymentOption,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

impl CartItem {
    #[must_use]
    pub fn variant_key(&self) -> VariantKey {
        VariantKey {
            color: self.color,
            country: self.country.clone(),
            payment_option: self.payment_option,
        }
    }

    fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
        self.total_price = self.unit_price * Decimal::from(quantity);
    }
}

/// The cart for one browser session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Add a variant, merging into an existing line with the same key.
    ///
    /// The unit price always comes from the catalog.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` for a zero quantity,
    /// `CartError::QuantityTooLarge` if the merged line would exceed
    /// [`MAX_LINE_QUANTITY`], and `CartError::Catalog` for an unknown country.
    pub fn add_item(&mut self, item: NewCartItem) -> Result<&CartItem, CartError> {
        if item.quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }
        let country = catalog::country(&item.country)?;
        let key = VariantKey {
            color: item.color,
            country: country.code.to_owned(),
            payment_option: item.payment_option,
        };
        let id = key.line_id();

        if let Some(pos) = self.items.iter().position(|line| line.id == id) {
            let merged = self.items.get(pos).map_or(0, |line| line.quantity);
            let merged = merged.saturating_add(item.quantity);
            if merged > MAX_LINE_QUANTITY {
                return Err(CartError::QuantityTooLarge {
                    max: MAX_LINE_QUANTITY,
                });
            }
            let line = self
                .items
                .get_mut(pos)
                .ok_or(CartError::InvalidQuantity)?;
            line.set_quantity(merged);
            return Ok(&*line);
        }

        if item.quantity > MAX_LINE_QUANTITY {
            return Err(CartError::QuantityTooLarge {
                max: MAX_LINE_QUANTITY,
            });
        }

        let unit_price = key.payment_option.unit_price();
        let mut line = CartItem {
            id,
            color: key.color,
            country: key.country,
            payment_option: key.payment_option,
            quantity: 0,
            unit_price,
            total_price: Decimal::ZERO,
        };
        line.set_quantity(item.quantity);
        self.items.push(line);
        self.items.last().ok_or(CartError::InvalidQuantity)
    }

    /// Set a line's quantity. A quantity of zero or less removes the line.
    ///
    /// Unknown ids are ignored.
    ///
    /// # Errors
    ///
    /// Returns `CartError::QuantityTooLarge` above [`MAX_LINE_QUANTITY`].
    pub fn update_quantity(&mut self, id: &str, quantity: i64) -> Result<(), CartError> {
        if quantity <= 0 {
            self.remove_item(id);
            return Ok(());
        }
        let quantity = u32::try_from(quantity)
            .ok()
            .filter(|q| *q <= MAX_LINE_QUANTITY)
            .ok_or(CartError::QuantityTooLarge {
                max: MAX_LINE_QUANTITY,
            })?;
        if let Some(line) = self.items.iter_mut().find(|line| line.id == id) {
            line.set_quantity(quantity);
        }
        Ok(())
    }

    /// Remove a line. Returns whether anything was removed.
    pub fn remove_item(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|line| line.id != id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of `unit_price * quantity` over all lines.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.items
            .iter()
            .map(|line| line.unit_price * Decimal::from(line.quantity))
            .sum()
    }

    /// Number of units across all lines.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.items.iter().map(|line| line.quantity).sum()
    }

    /// Canonical text form of the cart contents.
    ///
    /// Lines are sorted by id so two carts with the same contents produce
    /// the same string regardless of insertion order.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut lines: Vec<_> = self
            .items
            .iter()
            .map(|line| format!("{}x{}@{}", line.id, line.quantity, line.unit_price))
            .collect();
        lines.sort_unstable();
        lines.join(";")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn item(color: Color, country: &str, option: PaymentOption, quantity: u32) -> NewCartItem {
        NewCartItem {
            color,
            country: country.to_owned(),
            payment_option: option,
            quantity,
        }
    }

    #[test]
    fn test_same_variant_merges() {
        let mut cart = Cart::new();
        cart.add_item(item(Color::BlushChrome, "us", PaymentOption::Deposit, 1))
            .unwrap();
        cart.add_item(item(Color::BlushChrome, "us", PaymentOption::Deposit, 2))
            .unwrap();

        assert_eq!(cart.items().len(), 1);
        let line = &cart.items()[0];
        assert_eq!(line.id, "blush-chrome-us-deposit");
        assert_eq!(line.quantity, 3);
        assert_eq!(line.total_price, Decimal::new(150, 0));
    }

    #[test]
    fn test_different_variants_append() {
        let mut cart = Cart::new();
        cart.add_item(item(Color::BlushChrome, "us", PaymentOption::Deposit, 1))
            .unwrap();
        cart.add_item(item(Color::BlushChrome, "ca", PaymentOption::Deposit, 1))
            .unwrap();
        cart.add_item(item(Color::BlushChrome, "us", PaymentOption::Full, 1))
            .unwrap();
        cart.add_item(item(Color::RoseGold, "us", PaymentOption::Deposit, 1))
            .unwrap();
        assert_eq!(cart.items().len(), 4);
    }

    #[test]
    fn test_country_code_is_normalized() {
        let mut cart = Cart::new();
        cart.add_item(item(Color::IceChrome, "GB", PaymentOption::Full, 1))
            .unwrap();
        cart.add_item(item(Color::IceChrome, "gb", PaymentOption::Full, 1))
            .unwrap();
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].id, "ice-chrome-gb-full");
    }

    #[test]
    fn test_update_to_zero_removes_line() {
        let mut cart = Cart::new();
        let id = cart
            .add_item(item(Color::BlackMist, "us", PaymentOption::Full, 2))
            .unwrap()
            .id
            .clone();
        cart.update_quantity(&id, 0).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_negative_removes_line() {
        let mut cart = Cart::new();
        let id = cart
            .add_item(item(Color::BlackMist, "us", PaymentOption::Full, 2))
            .unwrap()
            .id
            .clone();
        cart.update_quantity(&id, -3).unwrap();
        assert!(cart.get(&id).is_none());
    }

    #[test]
    fn test_update_recomputes_total() {
        let mut cart = Cart::new();
        let id = cart
            .add_item(item(Color::BlackMist, "us", PaymentOption::Full, 1))
            .unwrap()
            .id
            .clone();
        cart.update_quantity(&id, 4).unwrap();
        let line = cart.get(&id).unwrap();
        assert_eq!(line.quantity, 4);
        assert_eq!(line.total_price, Decimal::new(2400, 0));
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(item(Color::BlackMist, "us", PaymentOption::Full, 1))
            .unwrap();
        cart.update_quantity("nope", 5).unwrap();
        assert_eq!(cart.total_items(), 1);
    }

    #[test]
    fn test_totals() {
        let mut cart = Cart::new();
        cart.add_item(item(Color::BlushChrome, "us", PaymentOption::Full, 2))
            .unwrap();
        cart.add_item(item(Color::RoseGold, "ca", PaymentOption::Deposit, 3))
            .unwrap();
        assert_eq!(cart.total_items(), 5);
        assert_eq!(cart.total_price(), Decimal::new(1350, 0));

        cart.clear();
        assert_eq!(cart.total_items(), 0);
        assert_eq!(cart.total_price(), Decimal::ZERO);
    }

    #[test]
    fn test_rejects_zero_quantity_and_unknown_country() {
        let mut cart = Cart::new();
        assert_eq!(
            cart.add_item(item(Color::BlushChrome, "us", PaymentOption::Full, 0))
                .unwrap_err(),
            CartError::InvalidQuantity
        );
        assert!(matches!(
            cart.add_item(item(Color::BlushChrome, "xx", PaymentOption::Full, 1)),
            Err(CartError::Catalog(CatalogError::UnknownCountry(_)))
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_quantity_ceiling() {
        let mut cart = Cart::new();
        cart.add_item(item(Color::BlushChrome, "us", PaymentOption::Deposit, 98))
            .unwrap();
        let err = cart
            .add_item(item(Color::BlushChrome, "us", PaymentOption::Deposit, 2))
            .unwrap_err();
        assert_eq!(err, CartError::QuantityTooLarge { max: 99 });
        assert_eq!(cart.total_items(), 98);

        let err = cart
            .update_quantity("blush-chrome-us-deposit", 100)
            .unwrap_err();
        assert_eq!(err, CartError::QuantityTooLarge { max: 99 });
    }

    #[test]
    fn test_fingerprint_ignores_insertion_order() {
        let mut a = Cart::new();
        a.add_item(item(Color::BlushChrome, "us", PaymentOption::Full, 1))
            .unwrap();
        a.add_item(item(Color::RoseGold, "us", PaymentOption::Deposit, 2))
            .unwrap();

        let mut b = Cart::new();
        b.add_item(item(Color::RoseGold, "us", PaymentOption::Deposit, 2))
            .unwrap();
        b.add_item(item(Color::BlushChrome, "us", PaymentOption::Full, 1))
            .unwrap();

        assert_eq!(a.fingerprint(), b.fingerprint());

        b.update_quantity("rose-gold-us-deposit", 3).unwrap();
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_session_serialization_roundtrip() {
        let mut cart = Cart::new();
        cart.add_item(item(Color::IceChrome, "us", PaymentOption::Full, 2))
            .unwrap();
        let json = serde_json::to_value(&cart).unwrap();
        let restored: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(restored, cart);
    }
}
