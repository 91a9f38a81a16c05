//! # Domain Types
//!
//! Core domain types used throughout Bazaar.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    Customer     │   │     Order       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  name           │   │  name           │   │  customer_id    │       │
//! │  │  description    │   │  email          │   │  status         │       │
//! │  │  price_cents    │   │  address        │   │  total_cents    │       │
//! │  └─────────────────┘   └─────────────────┘   │  lines          │       │
//! │                                              └─────────────────┘       │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │   OrderLine     │   │   OrderStatus   │                             │
//! │  │  ─────────────  │   │  ─────────────  │                             │
//! │  │  snapshot of    │   │  Created        │                             │
//! │  │  name + price   │   │                 │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Semantics
//! An `OrderLine` copies the product's name, description, and price at the
//! instant the order is created. Later catalog edits never change an order
//! that has already been placed.
//!
//! Ownership is one-directional: an `Order` holds a `customer_id`, a `Cart`
//! holds a `customer_id`. There are no back-pointers to keep in sync; the
//! customer's order history is a store query, not a mutable collection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
///
/// The catalog is the single source of current prices. Everything that needs
/// a price at a point in time (an order line) copies it out of here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Optional longer description.
    pub description: Option<String>,

    /// Current price in cents (smallest currency unit). Never negative.
    pub price_cents: i64,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the current price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A registered customer.
///
/// Credentials are deliberately absent here; authentication lives in the
/// controller layer and never reaches the domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Order Status
// =============================================================================

/// The status of an order.
///
/// Only `Created` is modeled; payment and fulfillment transitions belong to
/// systems downstream of the `orders` event stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Order has been created from a cart and persisted.
    Created,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Created
    }
}

// =============================================================================
// Order Line
// =============================================================================

/// A line item in an order.
/// Uses the snapshot pattern to freeze product data at order-creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderLine {
    pub product_id: String,
    /// Product name at order time (frozen).
    pub product_name: String,
    /// Product description at order time (frozen).
    pub product_description: Option<String>,
    /// Quantity ordered.
    pub quantity: i64,
    /// Unit price in cents at order time (frozen).
    pub unit_price_cents: i64,
}

impl OrderLine {
    /// Builds an order line by snapshotting a product at the given quantity.
    ///
    /// ## Price Freezing
    /// The name, description, and price are captured at this moment. If the
    /// product changes in the catalog afterwards, this line keeps the
    /// original values.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        OrderLine {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            product_description: product.description.clone(),
            quantity,
            unit_price_cents: product.price_cents,
        }
    }

    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// The line extension: unit price times quantity, exact.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Order
// =============================================================================

/// An immutable record of a committed purchase.
///
/// Created exactly once from a non-empty cart; never mutated afterwards
/// except for deletion. The stored total equals the sum of the stored line
/// extensions at creation time and is never recomputed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub customer_id: String,
    pub status: OrderStatus,
    /// Total amount in cents, equal to the sum of line extensions.
    pub total_cents: i64,
    pub lines: Vec<OrderLine>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Returns the stored total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Recomputes the total from the stored lines.
    ///
    /// For a well-formed order this always equals [`Order::total`]; tests
    /// use it to assert the invariant.
    pub fn lines_total(&self) -> Money {
        self.lines
            .iter()
            .fold(Money::zero(), |acc, line| acc + line.line_total())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_product(id: &str, price_cents: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            description: Some(format!("Description of product {}", id)),
            price_cents,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_order_line_snapshots_product() {
        let mut product = test_product("p1", 1000);
        let line = OrderLine::from_product(&product, 2);

        // Later catalog changes must not leak into the snapshot
        product.name = "Renamed".to_string();
        product.price_cents = 9999;

        assert_eq!(line.product_name, "Product p1");
        assert_eq!(line.unit_price_cents, 1000);
        assert_eq!(line.line_total().cents(), 2000);
    }

    #[test]
    fn test_order_total_matches_lines() {
        let order = Order {
            id: "o1".to_string(),
            customer_id: "c1".to_string(),
            status: OrderStatus::Created,
            total_cents: 2500,
            lines: vec![
                OrderLine::from_product(&test_product("a", 1000), 2),
                OrderLine::from_product(&test_product("b", 500), 1),
            ],
            created_at: Utc::now(),
        };

        assert_eq!(order.lines_total(), order.total());
    }

    #[test]
    fn test_order_status_serializes_screaming() {
        let json = serde_json::to_string(&OrderStatus::Created).unwrap();
        assert_eq!(json, "\"CREATED\"");
    }

    #[test]
    fn test_order_status_default() {
        assert_eq!(OrderStatus::default(), OrderStatus::Created);
    }
}
