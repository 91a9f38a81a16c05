//! # Order Repository
//!
//! Database operations for immutable order records.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Lifecycle                                   │
//! │                                                                         │
//! │  1. CREATE                                                              │
//! │     └── create() → Order { status: Created }                           │
//! │         Order row and all line rows insert in ONE transaction.         │
//! │         When create() returns, the order exists with its id; this is   │
//! │         the durability point of order placement.                       │
//! │                                                                         │
//! │  2. READ                                                                │
//! │     └── get_by_id() / list_all() / list_by_customer()                  │
//! │                                                                         │
//! │  3. DELETE                                                              │
//! │     └── delete() → lines removed by cascade                            │
//! │                                                                         │
//! │  There is no update. Orders are snapshots and never change.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use bazaar_core::{Order, OrderLine, OrderStatus};

/// Row shape of the `orders` table; lines are fetched separately.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
    customer_id: String,
    status: OrderStatus,
    total_cents: i64,
    created_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, lines: Vec<OrderLine>) -> Order {
        Order {
            id: self.id,
            customer_id: self.customer_id,
            status: self.status,
            total_cents: self.total_cents,
            lines,
            created_at: self.created_at,
        }
    }
}

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Persists a new order with its lines.
    ///
    /// ## Id Assignment
    /// The store assigns a fresh UUID v4 here. Ids are unique and never
    /// reused, including after deletion.
    ///
    /// ## Atomicity
    /// The order row and every line row are written in a single
    /// transaction; a failure leaves nothing behind.
    pub async fn create(
        &self,
        customer_id: &str,
        lines: Vec<OrderLine>,
        total_cents: i64,
    ) -> DbResult<Order> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        debug!(order_id = %id, customer_id = %customer_id, lines = lines.len(), "Creating order");

        let order = Order {
            id: id.clone(),
            customer_id: customer_id.to_string(),
            status: OrderStatus::Created,
            total_cents,
            lines,
            created_at: now,
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, customer_id, status, total_cents, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&order.id)
        .bind(&order.customer_id)
        .bind(order.status)
        .bind(order.total_cents)
        .bind(order.created_at)
        .execute(&mut *tx)
        .await?;

        for (position, line) in order.lines.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_lines (
                    order_id, position, product_id, product_name,
                    product_description, quantity, unit_price_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&order.id)
            .bind(position as i64)
            .bind(&line.product_id)
            .bind(&line.product_name)
            .bind(&line.product_description)
            .bind(line.quantity)
            .bind(line.unit_price_cents)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(order)
    }

    /// Gets an order by ID, including its lines.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, customer_id, status, total_cents, created_at
            FROM orders
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let lines = self.fetch_lines(&row.id).await?;
                Ok(Some(row.into_order(lines)))
            }
            None => Ok(None),
        }
    }

    /// Lists all orders, oldest first.
    pub async fn list_all(&self) -> DbResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, customer_id, status, total_cents, created_at
            FROM orders
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        self.assemble(rows).await
    }

    /// Lists a customer's orders, oldest first.
    ///
    /// This query IS the customer's order history; there is no collection
    /// on the customer row to keep in sync.
    pub async fn list_by_customer(&self, customer_id: &str) -> DbResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, customer_id, status, total_cents, created_at
            FROM orders
            WHERE customer_id = ?1
            ORDER BY created_at, id
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        self.assemble(rows).await
    }

    /// Checks whether an order exists.
    pub async fn exists(&self, id: &str) -> DbResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE id = ?1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    /// Counts all orders (for diagnostics and tests).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Deletes an order; its lines go with it by cascade.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(order_id = %id, "Deleting order");

        let result = sqlx::query("DELETE FROM orders WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        Ok(())
    }

    async fn fetch_lines(&self, order_id: &str) -> DbResult<Vec<OrderLine>> {
        let lines = sqlx::query_as::<_, OrderLine>(
            r#"
            SELECT product_id, product_name, product_description, quantity, unit_price_cents
            FROM order_lines
            WHERE order_id = ?1
            ORDER BY position
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    async fn assemble(&self, rows: Vec<OrderRow>) -> DbResult<Vec<Order>> {
        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let lines = self.fetch_lines(&row.id).await?;
            orders.push(row.into_order(lines));
        }
        Ok(orders)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
