//! # Cart Aggregate
//!
//! The per-customer shopping cart and its line-merging rules.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Caller Action            Service Call            Cart Change           │
//! │  ─────────────            ────────────            ───────────           │
//! │                                                                         │
//! │  Add product ────────────► add_line() ──────────► merge or append      │
//! │                                                                         │
//! │  Change quantity ────────► update_quantity() ───► set qty / remove     │
//! │                                                                         │
//! │  Remove product ─────────► remove_line() ───────► drop the line        │
//! │                                                                         │
//! │  Place order / cancel ───► clear() ─────────────► lines.clear()        │
//! │                                                                         │
//! │  NOTE: A cart stores intentions only: (product_id, quantity).          │
//! │        Prices are looked up from the catalog when the order is         │
//! │        created, never frozen into the cart.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Lines are unique by `product_id` (adding the same product merges quantities)
//! - Quantity is always > 0 (a quantity update to 0 removes the line)
//! - Line order is insertion order; it matters for display, not for totals

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Cart Line
// =============================================================================

/// One line of a cart: a product reference and a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CartLine {
    /// Product ID (UUID). The product itself stays in the catalog.
    pub product_id: String,

    /// Quantity wanted. Always > 0.
    pub quantity: i64,
}

// =============================================================================
// Cart
// =============================================================================

/// A customer's shopping cart.
///
/// There is exactly one cart per customer. It is created lazily on first
/// access and survives order placement with zero lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    /// Unique identifier (UUID v4), assigned by the cart store.
    pub id: String,

    /// The owning customer. Unique across all carts.
    pub customer_id: String,

    /// Lines in insertion order.
    pub lines: Vec<CartLine>,

    /// When the cart was created.
    pub created_at: DateTime<Utc>,

    /// When the cart was last modified.
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Creates a new empty cart for a customer.
    pub fn new(id: impl Into<String>, customer_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Cart {
            id: id.into(),
            customer_id: customer_id.into(),
            lines: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Adds a product to the cart or accumulates quantity if already present.
    ///
    /// ## Behavior
    /// - If the product already has a line: its quantity grows by `quantity`
    /// - Otherwise: a new line is appended
    ///
    /// The caller validates that `quantity` is positive before calling.
    pub fn add_line(&mut self, product_id: &str, quantity: i64) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) {
            line.quantity += quantity;
        } else {
            self.lines.push(CartLine {
                product_id: product_id.to_string(),
                quantity,
            });
        }
        self.updated_at = Utc::now();
    }

    /// Sets the quantity of an existing line.
    ///
    /// ## Behavior
    /// - Quantity 0: removes the line (a zero-quantity line is never kept)
    /// - Product not in cart: `CoreError::LineNotFound`
    ///
    /// Negative quantities are rejected by validation before this is called.
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity == 0 {
            return self.remove_line(product_id);
        }

        match self.lines.iter_mut().find(|l| l.product_id == product_id) {
            Some(line) => {
                line.quantity = quantity;
                self.updated_at = Utc::now();
                Ok(())
            }
            None => Err(CoreError::LineNotFound {
                product_id: product_id.to_string(),
            }),
        }
    }

    /// Removes a line from the cart by product ID.
    pub fn remove_line(&mut self, product_id: &str) -> CoreResult<()> {
        let initial_len = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);

        if self.lines.len() == initial_len {
            Err(CoreError::LineNotFound {
                product_id: product_id.to_string(),
            })
        } else {
            self.updated_at = Utc::now();
            Ok(())
        }
    }

    /// Clears all lines from the cart. Idempotent.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.updated_at = Utc::now();
    }

    /// Returns the number of distinct lines in the cart.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns the total quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_cart() -> Cart {
        Cart::new("cart-1", "customer-1")
    }

    #[test]
    fn test_add_line() {
        let mut cart = test_cart();
        cart.add_line("p1", 2);

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.total_quantity(), 2);
    }

    #[test]
    fn test_add_same_product_accumulates() {
        let mut cart = test_cart();
        cart.add_line("p1", 2);
        cart.add_line("p1", 3);

        // Still one line, quantities merged
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.lines[0].quantity, 5);
    }

    #[test]
    fn test_lines_keep_insertion_order() {
        let mut cart = test_cart();
        cart.add_line("p2", 1);
        cart.add_line("p1", 1);
        cart.add_line("p2", 1);

        let ids: Vec<&str> = cart.lines.iter().map(|l| l.product_id.as_str()).collect();
        assert_eq!(ids, vec!["p2", "p1"]);
    }

    #[test]
    fn test_update_quantity() {
        let mut cart = test_cart();
        cart.add_line("p1", 2);

        cart.update_quantity("p1", 7).unwrap();
        assert_eq!(cart.lines[0].quantity, 7);
    }

    #[test]
    fn test_update_quantity_to_zero_removes_line() {
        let mut cart = test_cart();
        cart.add_line("p1", 2);

        cart.update_quantity("p1", 0).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_missing_line() {
        let mut cart = test_cart();
        let err = cart.update_quantity("ghost", 1).unwrap_err();
        assert!(matches!(err, CoreError::LineNotFound { .. }));
    }

    #[test]
    fn test_remove_line() {
        let mut cart = test_cart();
        cart.add_line("p1", 2);
        cart.add_line("p2", 1);

        cart.remove_line("p1").unwrap();
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.lines[0].product_id, "p2");
    }

    #[test]
    fn test_remove_missing_line_leaves_cart_unchanged() {
        let mut cart = test_cart();
        cart.add_line("p1", 2);

        let err = cart.remove_line("ghost").unwrap_err();
        assert!(matches!(err, CoreError::LineNotFound { .. }));
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.lines[0].quantity, 2);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut cart = test_cart();
        cart.add_line("p1", 2);

        cart.clear();
        assert!(cart.is_empty());

        // Clearing an already-empty cart succeeds and stays empty
        cart.clear();
        assert!(cart.is_empty());
    }
}
