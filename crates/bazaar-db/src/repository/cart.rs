//! # Cart Repository
//!
//! Database operations for per-customer carts.
//!
//! ## Storage Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  carts                         cart_lines                               │
//! │  ─────                         ──────────                               │
//! │  id (PK)                       cart_id ──► carts.id (CASCADE)          │
//! │  customer_id (UNIQUE)          product_id                               │
//! │  created_at                    quantity (> 0)                           │
//! │  updated_at                    position  (insertion order)              │
//! │                                                                         │
//! │  One cart per customer, created lazily on first access.                │
//! │  Saving a cart replaces its full line set in one transaction, so a     │
//! │  cart on disk is always exactly what some caller last observed.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Callers serialize access per customer (see the service layer's lock
//! registry); this repository assumes one writer per cart at a time.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use bazaar_core::{Cart, CartLine};

/// Row shape of the `carts` table; lines are fetched separately.
#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    id: String,
    customer_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CartRow {
    fn into_cart(self, lines: Vec<CartLine>) -> Cart {
        Cart {
            id: self.id,
            customer_id: self.customer_id,
            lines,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Repository for cart database operations.
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    /// Creates a new CartRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// Gets the cart for a customer, if one exists.
    pub async fn get_by_customer(&self, customer_id: &str) -> DbResult<Option<Cart>> {
        let row = sqlx::query_as::<_, CartRow>(
            r#"
            SELECT id, customer_id, created_at, updated_at
            FROM carts
            WHERE customer_id = ?1
            "#,
        )
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let lines = self.fetch_lines(&row.id).await?;
                Ok(Some(row.into_cart(lines)))
            }
            None => Ok(None),
        }
    }

    /// Gets the customer's cart, creating an empty one if none exists.
    ///
    /// ## Lazy Creation
    /// A customer has no cart row until something first touches their cart.
    /// The UNIQUE constraint on `customer_id` backstops concurrent creation:
    /// the insert is a no-op when another writer got there first, and the
    /// follow-up read returns whichever row won.
    pub async fn get_or_create(&self, customer_id: &str) -> DbResult<Cart> {
        if let Some(cart) = self.get_by_customer(customer_id).await? {
            return Ok(cart);
        }

        let id = generate_cart_id();
        let now = Utc::now();

        debug!(cart_id = %id, customer_id = %customer_id, "Creating cart");

        sqlx::query(
            r#"
            INSERT INTO carts (id, customer_id, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (customer_id) DO NOTHING
            "#,
        )
        .bind(&id)
        .bind(customer_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        match self.get_by_customer(customer_id).await? {
            Some(cart) => Ok(cart),
            // The row cannot vanish between insert and read under the
            // per-customer serialization contract, but stay total anyway.
            None => Ok(Cart::new(id, customer_id)),
        }
    }

    /// Saves a cart, replacing its full line set.
    ///
    /// Runs in one transaction: delete existing lines, insert the current
    /// ones with their positions, bump `updated_at`.
    pub async fn save(&self, cart: &Cart) -> DbResult<()> {
        debug!(cart_id = %cart.id, lines = cart.lines.len(), "Saving cart");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE carts SET updated_at = ?2 WHERE id = ?1")
            .bind(&cart.id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM cart_lines WHERE cart_id = ?1")
            .bind(&cart.id)
            .execute(&mut *tx)
            .await?;

        for (position, line) in cart.lines.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO cart_lines (cart_id, product_id, quantity, position)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )
            .bind(&cart.id)
            .bind(&line.product_id)
            .bind(line.quantity)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    /// Removes every line from a cart, leaving the empty cart row in place.
    ///
    /// Idempotent: clearing an already-empty cart is a successful no-op.
    pub async fn clear_lines(&self, cart_id: &str) -> DbResult<()> {
        debug!(cart_id = %cart_id, "Clearing cart lines");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM cart_lines WHERE cart_id = ?1")
            .bind(cart_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE carts SET updated_at = ?2 WHERE id = ?1")
            .bind(cart_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Deletes a cart and (via cascade) its lines.
    pub async fn delete(&self, cart_id: &str) -> DbResult<()> {
        debug!(cart_id = %cart_id, "Deleting cart");

        sqlx::query("DELETE FROM carts WHERE id = ?1")
            .bind(cart_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn fetch_lines(&self, cart_id: &str) -> DbResult<Vec<CartLine>> {
        let lines = sqlx::query_as::<_, CartLine>(
            r#"
            SELECT product_id, quantity
            FROM cart_lines
            WHERE cart_id = ?1
            ORDER BY position
            "#,
        )
        .bind(cart_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }
}

/// Helper to generate a new cart ID.
pub fn generate_cart_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_get_or_create_is_lazy_and_stable() {
        let db = test_db().await;
        let repo = db.carts();

        assert!(repo.get_by_customer("c1").await.unwrap().is_none());

        let cart = repo.get_or_create("c1").await.unwrap();
        assert!(cart.is_empty());

        // Second call returns the same cart, not a new one
        let again = repo.get_or_create("c1").await.unwrap();
        assert_eq!(again.id, cart.id);
    }

    #[tokio::test]
    async fn test_save_replaces_lines_in_order() {
        let db = test_db().await;
        let repo = db.carts();

        let mut cart = repo.get_or_create("c1").await.unwrap();
        cart.add_line("p2", 1);
        cart.add_line("p1", 4);
        repo.save(&cart).await.unwrap();

        let loaded = repo.get_by_customer("c1").await.unwrap().unwrap();
        let ids: Vec<&str> = loaded.lines.iter().map(|l| l.product_id.as_str()).collect();
        assert_eq!(ids, vec!["p2", "p1"]);
        assert_eq!(loaded.lines[1].quantity, 4);

        // Saving again with fewer lines drops the rest
        let mut cart = loaded;
        cart.remove_line("p2").unwrap();
        repo.save(&cart).await.unwrap();

        let loaded = repo.get_by_customer("c1").await.unwrap().unwrap();
        assert_eq!(loaded.line_count(), 1);
        assert_eq!(loaded.lines[0].product_id, "p1");
    }

    #[tokio::test]
    async fn test_clear_lines_keeps_cart_row() {
        let db = test_db().await;
        let repo = db.carts();

        let mut cart = repo.get_or_create("c1").await.unwrap();
        cart.add_line("p1", 2);
        repo.save(&cart).await.unwrap();

        repo.clear_lines(&cart.id).await.unwrap();

        let loaded = repo.get_by_customer("c1").await.unwrap().unwrap();
        assert_eq!(loaded.id, cart.id);
        assert!(loaded.is_empty());

        // Idempotent on an already-empty cart
        repo.clear_lines(&cart.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_removes_cart_and_lines() {
        let db = test_db().await;
        let repo = db.carts();

        let mut cart = repo.get_or_create("c1").await.unwrap();
        cart.add_line("p1", 2);
        repo.save(&cart).await.unwrap();

        repo.delete(&cart.id).await.unwrap();
        assert!(repo.get_by_customer("c1").await.unwrap().is_none());

        // Lines went with the cart (cascade)
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cart_lines")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
