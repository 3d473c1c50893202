//! # Cart State
//!
//! The in-progress cart of the register session, shared between commands.
//!
//! The cart itself ([`barista_core::Cart`]) is plain data. This wrapper adds
//! `Arc<Mutex<_>>` so commands running on different tasks see one cart.
//! The lock is never held across an `.await`.

use std::sync::{Arc, Mutex, PoisonError};

use barista_core::Cart;

/// Thread-safe handle to the session cart.
#[derive(Debug, Clone, Default)]
pub struct CartState {
    cart: Arc<Mutex<Cart>>,
}

impl CartState {
    /// Creates a new empty cart state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Executes a function with read access to the cart.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let totals = cart_state.with_cart(|c| CartTotals::from(c));
    /// ```
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        // Poisoning is ignored: every Cart method leaves the cart consistent.
        let cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&cart)
    }

    /// Executes a function with write access to the cart.
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut cart)
    }

    /// A copy of the cart as it is now.
    pub fn snapshot(&self) -> Cart {
        self.with_cart(Cart::clone)
    }

    pub fn clear(&self) {
        self.with_cart_mut(Cart::clear);
    }
}
