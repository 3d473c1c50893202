//! # Cart
//!
//! The in-progress sale: a list of product snapshots and quantities.
//!
//! ## Cart Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Screen Action            Cart Operation          Cart Change           │
//! │  ─────────────            ──────────────          ───────────           │
//! │                                                                         │
//! │  Tap product ───────────► add_item() ───────────► push or qty += n     │
//! │                                                                         │
//! │  Change quantity ───────► update_quantity() ────► qty = n (0 removes)  │
//! │                                                                         │
//! │  Remove line ───────────► remove_item() ────────► line filtered out    │
//! │                                                                         │
//! │  Clear / settled ───────► clear() ──────────────► items.clear()        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cart never touches stock. Availability is checked once, at
//! settlement, against the latest catalog and material state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, EntityKind, ValidationError};
use crate::money::Money;
use crate::types::Product;
use crate::validation::validate_quantity;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// A line in the cart.
///
/// ## Design Notes
/// Name, price and cost are frozen when the product is added. The sale is
/// recorded at these values even if the catalog changes before checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: String,

    /// Product name at time of adding (frozen)
    pub product_name: String,

    /// Selling price at time of adding (frozen)
    pub unit_price: Money,

    /// Cost price at time of adding (frozen)
    pub cost_price: Money,

    pub quantity: i64,

    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    /// Snapshots `product` at this moment.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        CartItem {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            unit_price: product.price,
            cost_price: product.cost_price,
            quantity,
            added_at: Utc::now(),
        }
    }

    /// unit price × quantity
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }

    /// (unit price − cost price) × quantity
    pub fn line_profit(&self) -> Money {
        (self.unit_price - self.cost_price).multiply_quantity(self.quantity)
    }
}

/// The shopping cart.
///
/// ## Invariants
/// - Lines are unique by `product_id` (adding the same product increases quantity)
/// - Every quantity is in `1..=MAX_ITEM_QUANTITY`
/// - At most `MAX_CART_ITEMS` lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    items: Vec<CartItem>,

    /// When the cart was created or last cleared
    #[ts(as = "String")]
    created_at: DateTime<Utc>,
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

impl Cart {
    pub fn new() -> Self {
        Cart {
            items: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Adds a product or increases its quantity if already present.
    pub fn add_item(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        validate_quantity(quantity)?;

        if let Some(index) = self.position(&product.id) {
            let new_qty = self.items[index].quantity + quantity;
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            return self.set_quantity(index, new_qty);
        }

        if self.items.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        self.items.push(CartItem::from_product(product, quantity));
        if let Err(err) = self.check_totals() {
            self.items.pop();
            return Err(err);
        }
        Ok(())
    }

    /// Sets the quantity of a line. Zero or less removes it.
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity <= 0 {
            self.remove_item(product_id);
            return Ok(());
        }

        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }

        match self.position(product_id) {
            Some(index) => self.set_quantity(index, quantity),
            None => Err(CoreError::not_found(EntityKind::CartItem, product_id)),
        }
    }

    fn position(&self, product_id: &str) -> Option<usize> {
        self.items.iter().position(|i| i.product_id == product_id)
    }

    /// Sets a line's quantity, keeping the old one if the totals would overflow.
    fn set_quantity(&mut self, index: usize, quantity: i64) -> CoreResult<()> {
        let previous = std::mem::replace(&mut self.items[index].quantity, quantity);
        if let Err(err) = self.check_totals() {
            self.items[index].quantity = previous;
            return Err(err);
        }
        Ok(())
    }

    /// Subtotal and profit must fit in `Decimal`, or checkout could not
    /// price the cart.
    fn check_totals(&self) -> CoreResult<()> {
        let mut subtotal = Money::zero();
        let mut profit = Money::zero();
        for item in &self.items {
            let line = item.unit_price.checked_multiply_quantity(item.quantity);
            let margin = (item.unit_price - item.cost_price).checked_multiply_quantity(item.quantity);
            match (
                line.and_then(|l| subtotal.checked_add(l)),
                margin.and_then(|m| profit.checked_add(m)),
            ) {
                (Some(s), Some(p)) => {
                    subtotal = s;
                    profit = p;
                }
                _ => {
                    return Err(ValidationError::OutOfRange {
                        field: "subtotal".to_string(),
                    }
                    .into())
                }
            }
        }
        Ok(())
    }

    /// Removes a line. Returns whether anything was removed.
    pub fn remove_item(&mut self, product_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.created_at = Utc::now();
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn get(&self, product_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Units across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Σ unit price × quantity, recomputed on every call.
    pub fn subtotal(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Σ line profit at the frozen prices.
    pub fn profit(&self) -> Money {
        self.items.iter().map(CartItem::line_profit).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Cart summary for the POS screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub item_count: usize,
    pub total_quantity: i64,
    pub subtotal: Money,
    pub profit: Money,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            item_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
            subtotal: cart.subtotal(),
            profit: cart.profit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_product(id: &str, price_cents: i64, cost_cents: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            price: Money::from_cents(price_cents),
            cost_price: Money::from_cents(cost_cents),
            stock: 50,
            category: "Coffee".to_string(),
            image: None,
            ingredients: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_cart_add_item() {
        let mut cart = Cart::new();
        let product = test_product("1", 350, 120);

        cart.add_item(&product, 2).unwrap();

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total_quantity(), 2);
        assert_eq!(cart.subtotal(), Money::from_cents(700));
        assert_eq!(cart.profit(), Money::from_cents(460));
    }

    #[test]
    fn test_cart_add_same_product_increases_quantity() {
        let mut cart = Cart::new();
        let product = test_product("1", 350, 120);

        cart.add_item(&product, 2).unwrap();
        cart.add_item(&product, 3).unwrap();

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total_quantity(), 5);
    }

    #[test]
    fn test_price_is_frozen_at_add_time() {
        let mut cart = Cart::new();
        let mut product = test_product("1", 350, 120);
        cart.add_item(&product, 1).unwrap();

        product.price = Money::from_cents(999);
        cart.add_item(&product, 1).unwrap();

        assert_eq!(cart.subtotal(), Money::from_cents(700));
    }

    #[test]
    fn test_update_quantity_and_remove() {
        let mut cart = Cart::new();
        let a = test_product("a", 350, 120);
        let b = test_product("b", 300, 100);
        cart.add_item(&a, 1).unwrap();
        cart.add_item(&b, 1).unwrap();

        cart.update_quantity("a", 4).unwrap();
        assert_eq!(cart.subtotal(), Money::from_cents(1700));

        cart.update_quantity("b", 0).unwrap();
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.subtotal(), Money::from_cents(1400));

        assert!(cart.update_quantity("zzz", 2).is_err());
        assert!(!cart.remove_item("zzz"));
        assert!(cart.remove_item("a"));
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), Money::zero());
    }

    #[test]
    fn test_quantity_limits() {
        let mut cart = Cart::new();
        let product = test_product("1", 350, 120);

        assert!(cart.add_item(&product, 0).is_err());
        cart.add_item(&product, MAX_ITEM_QUANTITY).unwrap();
        assert!(matches!(
            cart.add_item(&product, 1),
            Err(CoreError::QuantityTooLarge { .. })
        ));
        assert!(cart.update_quantity("1", MAX_ITEM_QUANTITY + 1).is_err());
        assert_eq!(cart.total_quantity(), MAX_ITEM_QUANTITY);
    }

    #[test]
    fn test_line_limit() {
        let mut cart = Cart::new();
        for i in 0..MAX_CART_ITEMS {
            cart.add_item(&test_product(&i.to_string(), 100, 50), 1).unwrap();
        }
        assert!(matches!(
            cart.add_item(&test_product("one-more", 100, 50), 1),
            Err(CoreError::CartTooLarge { max: MAX_CART_ITEMS })
        ));
    }

    #[test]
    fn test_subtotal_tracks_mutation_sequence() {
        let mut cart = Cart::new();
        let a = test_product("a", 350, 120);
        let b = test_product("b", 450, 200);

        cart.add_item(&a, 2).unwrap();
        cart.add_item(&b, 3).unwrap();
        cart.update_quantity("a", 1).unwrap();
        cart.remove_item("b");
        cart.add_item(&b, 1).unwrap();

        let expected: Money = cart.items().iter().map(|i| i.unit_price * i.quantity).sum();
        assert_eq!(cart.subtotal(), expected);
        assert_eq!(cart.subtotal(), Money::from_cents(800));
    }

    #[test]
    fn test_cart_clear() {
        let mut cart = Cart::new();
        cart.add_item(&test_product("1", 350, 120), 2).unwrap();
        assert!(!cart.is_empty());

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(CartTotals::from(&cart).subtotal, Money::zero());
    }

    #[test]
    fn test_cart_refuses_unpriceable_totals() {
        let mut cart = Cart::new();
        let mut pricey = test_product("9", 0, 0);
        pricey.price = Money::new(rust_decimal::Decimal::MAX / rust_decimal::Decimal::from(100));

        cart.add_item(&pricey, 60).unwrap();
        let subtotal = cart.subtotal();

        assert!(matches!(
            cart.add_item(&pricey, 60),
            Err(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
        assert!(matches!(
            cart.update_quantity("9", 500),
            Err(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
        assert_eq!(cart.get("9").unwrap().quantity, 60);

        let mut twin = pricey.clone();
        twin.id = "10".to_string();
        assert!(matches!(
            cart.add_item(&twin, 50),
            Err(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.subtotal(), subtotal);
    }
}
