//! # Cart Service
//!
//! Cart mutations, serialized per customer.
//!
//! ## Operation Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Every Cart Mutation Follows This Shape                  │
//! │                                                                         │
//! │  1. validate input              (nothing written on failure)            │
//! │  2. resolve customer / product  (NotFound before any write)             │
//! │  3. acquire(customer_id)        (single writer per customer)            │
//! │  4. load cart (get-or-create)                                           │
//! │  5. mutate in memory            (pure logic in bazaar-core)             │
//! │  6. save                        (full line set, one transaction)        │
//! │  7. release (guard drop)                                                │
//! │                                                                         │
//! │  Steps 4-6 are the read-modify-write cycle the lock protects.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{ServiceError, ServiceResult};
use crate::locks::CustomerLocks;
use bazaar_core::{validation, Cart};
use bazaar_db::{CartRepository, CustomerRepository, ProductRepository};

/// Cart operations.
#[derive(Debug, Clone)]
pub struct CartService {
    carts: CartRepository,
    catalog: ProductRepository,
    customers: CustomerRepository,
    locks: Arc<CustomerLocks>,
}

impl CartService {
    /// Creates a new CartService over the given collaborators.
    pub fn new(
        carts: CartRepository,
        catalog: ProductRepository,
        customers: CustomerRepository,
        locks: Arc<CustomerLocks>,
    ) -> Self {
        CartService {
            carts,
            catalog,
            customers,
            locks,
        }
    }

    /// Returns the customer's cart, creating an empty one on first access.
    pub async fn get_cart(&self, customer_id: &str) -> ServiceResult<Cart> {
        self.ensure_customer(customer_id).await?;

        let _guard = self.locks.acquire(customer_id).await;
        Ok(self.carts.get_or_create(customer_id).await?)
    }

    /// Adds a quantity of a product to the cart.
    ///
    /// Merges into an existing line for the same product; otherwise appends
    /// a new line. The product must resolve in the catalog.
    pub async fn add_line(
        &self,
        customer_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> ServiceResult<Cart> {
        validation::validate_quantity(quantity)?;
        self.ensure_customer(customer_id).await?;

        let product = self
            .catalog
            .get_by_id(product_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("product", product_id))?;

        let _guard = self.locks.acquire(customer_id).await;

        let mut cart = self.carts.get_or_create(customer_id).await?;
        cart.add_line(&product.id, quantity);
        self.carts.save(&cart).await?;

        debug!(customer_id = %customer_id, product_id = %product_id, quantity = %quantity, "Line added to cart");

        Ok(cart)
    }

    /// Sets the quantity of an existing line; zero removes it.
    pub async fn update_line(
        &self,
        customer_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> ServiceResult<Cart> {
        validation::validate_quantity_update(quantity)?;
        self.ensure_customer(customer_id).await?;

        let _guard = self.locks.acquire(customer_id).await;

        let mut cart = self.carts.get_or_create(customer_id).await?;
        cart.update_quantity(product_id, quantity)?;
        self.carts.save(&cart).await?;

        debug!(customer_id = %customer_id, product_id = %product_id, quantity = %quantity, "Cart line updated");

        Ok(cart)
    }

    /// Removes a line from the cart.
    ///
    /// Fails with `NotFound` when the product has no line, leaving the cart
    /// unchanged.
    pub async fn remove_line(&self, customer_id: &str, product_id: &str) -> ServiceResult<Cart> {
        self.ensure_customer(customer_id).await?;

        let _guard = self.locks.acquire(customer_id).await;

        let mut cart = self.carts.get_or_create(customer_id).await?;
        cart.remove_line(product_id)?;
        self.carts.save(&cart).await?;

        debug!(customer_id = %customer_id, product_id = %product_id, "Line removed from cart");

        Ok(cart)
    }

    /// Empties the customer's cart. Idempotent.
    pub async fn clear_cart(&self, customer_id: &str) -> ServiceResult<()> {
        self.ensure_customer(customer_id).await?;

        let _guard = self.locks.acquire(customer_id).await;

        let cart = self.carts.get_or_create(customer_id).await?;
        self.carts.clear_lines(&cart.id).await?;

        info!(customer_id = %customer_id, "Cart cleared");

        Ok(())
    }

    async fn ensure_customer(&self, customer_id: &str) -> ServiceResult<()> {
        if !self.customers.exists(customer_id).await? {
            return Err(ServiceError::not_found("customer", customer_id));
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
