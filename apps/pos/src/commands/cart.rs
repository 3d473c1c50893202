//! # Cart Commands
//!
//! Commands for cart manipulation.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌───────────┐     ┌──────────┐     ┌──────────┐      │
//! │  │  Empty   │────►│ Populated │────►│ Settling │────►│  Empty   │      │
//! │  │  Cart    │     │           │     │          │     │          │      │
//! │  └──────────┘     └───────────┘     └──────────┘     └──────────┘      │
//! │                     │       ▲            │                              │
//! │               add_to_cart   └── failed ──┘                              │
//! │               update_cart_item  (unchanged)                            │
//! │               remove_from_cart                                         │
//! │                     │                                                   │
//! │                     ▼                                                   │
//! │               clear_cart ────────────────────────────► Empty           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use barista_core::{Cart, CartItem, CartTotals};
use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::error::ApiError;
use crate::state::{CartState, Shop};

/// Cart response including items and totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub items: Vec<CartItem>,
    pub totals: CartTotals,
}

impl From<&Cart> for CartResponse {
    fn from(cart: &Cart) -> Self {
        CartResponse {
            items: cart.items().to_vec(),
            totals: CartTotals::from(cart),
        }
    }
}

pub fn get_cart(cart: &CartState) -> CartResponse {
    debug!("get_cart command");
    cart.with_cart(|c| CartResponse::from(c))
}

/// Adds a product to the cart.
///
/// ## Behavior
/// - If product already in cart: quantity increases
/// - If product not in cart: added as new line
/// - Price and cost are frozen at the time of adding
/// - Stock is not checked here; checkout validates it
pub async fn add_to_cart(
    shop: &Shop,
    cart: &CartState,
    product_id: &str,
    quantity: Option<i64>,
) -> Result<CartResponse, ApiError> {
    let quantity = quantity.unwrap_or(1);
    debug!(product_id = %product_id, quantity, "add_to_cart command");

    let inventory = shop.snapshot().await;
    let product = inventory
        .catalog()
        .get(product_id)
        .ok_or_else(|| ApiError::not_found("Product", product_id))?;

    cart.with_cart_mut(|c| {
        c.add_item(product, quantity)?;
        Ok::<_, ApiError>(CartResponse::from(&*c))
    })
}

/// Sets the quantity of a line. Zero or less removes it.
pub fn update_cart_item(
    cart: &CartState,
    product_id: &str,
    quantity: i64,
) -> Result<CartResponse, ApiError> {
    debug!(product_id = %product_id, quantity, "update_cart_item command");

    cart.with_cart_mut(|c| {
        c.update_quantity(product_id, quantity)?;
        Ok::<_, ApiError>(CartResponse::from(&*c))
    })
}

pub fn remove_from_cart(cart: &CartState, product_id: &str) -> CartResponse {
    debug!(product_id = %product_id, "remove_from_cart command");

    cart.with_cart_mut(|c| {
        c.remove_item(product_id);
        CartResponse::from(&*c)
    })
}

pub fn clear_cart(cart: &CartState) -> CartResponse {
    debug!("clear_cart command");

    cart.with_cart_mut(|c| {
        c.clear();
        CartResponse::from(&*c)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use barista_core::Money;
    use barista_db::{Database, DbConfig};
    use std::sync::Arc;

    async fn shop() -> Shop {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        Shop::open(Arc::new(db), 1).await.unwrap()
    }

    #[tokio::test]
    async fn test_add_update_remove() {
        let shop = shop().await;
        let cart = CartState::new();

        add_to_cart(&shop, &cart, "1", Some(2)).await.unwrap();
        let response = add_to_cart(&shop, &cart, "3", None).await.unwrap();
        assert_eq!(response.totals.item_count, 2);
        // 2 × 3.50 + 5.00
        assert_eq!(response.totals.subtotal, Money::from_cents(1200));

        let response = update_cart_item(&cart, "1", 5).unwrap();
        assert_eq!(response.totals.total_quantity, 6);

        let response = update_cart_item(&cart, "1", 0).unwrap();
        assert_eq!(response.totals.item_count, 1);

        let response = remove_from_cart(&cart, "3");
        assert!(response.items.is_empty());
        assert_eq!(response.totals.subtotal, Money::zero());
    }

    #[tokio::test]
    async fn test_add_unknown_product() {
        let shop = shop().await;
        let cart = CartState::new();

        let err = add_to_cart(&shop, &cart, "99", None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert!(get_cart(&cart).items.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_quantities() {
        let shop = shop().await;
        let cart = CartState::new();

        let err = add_to_cart(&shop, &cart, "1", Some(0)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = update_cart_item(&cart, "1", 3).unwrap_err();
        assert_eq!(err.code, ErrorCode::CartError);
    }

    #[tokio::test]
    async fn test_clear_cart() {
        let shop = shop().await;
        let cart = CartState::new();
        add_to_cart(&shop, &cart, "2", Some(3)).await.unwrap();

        let response = clear_cart(&cart);
        assert!(response.items.is_empty());
        assert_eq!(response.totals.total_quantity, 0);
    }
}
