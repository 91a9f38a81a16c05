//! # Product Repository
//!
//! Database operations for the product catalog.
//!
//! The catalog is read-only to order creation: placing an order looks
//! products up here and copies their current name, description, and price
//! into the order lines.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use bazaar_core::Product;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let product = repo.get_by_id("uuid-here").await?;
/// let all = repo.list_all().await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a new product.
    ///
    /// ## Arguments
    /// * `product` - Product to insert (id should be generated beforehand)
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, description, price_cents, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product.clone())
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, price_cents, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists all products, sorted by name.
    pub async fn list_all(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, price_cents, created_at, updated_at
            FROM products
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Updates a product's price.
    ///
    /// Orders placed before the change keep their snapshots; only future
    /// orders see the new price.
    pub async fn update_price(&self, id: &str, price_cents: i64) -> DbResult<()> {
        debug!(id = %id, price_cents = %price_cents, "Updating product price");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET price_cents = ?2, updated_at = ?3 WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(price_cents)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Deletes a product.
    ///
    /// Order lines keep their snapshots, so history survives the deletion.
    /// Cart lines referencing the product are left in place; they surface
    /// as "product not found" when the cart is turned into an order.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn sample_product(name: &str, price_cents: i64) -> Product {
        let now = Utc::now();
        Product {
            id: generate_product_id(),
            name: name.to_string(),
            description: Some(format!("{} description", name)),
            price_cents,
            created_at: now,
            updated_at: now,
        }
    }

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = test_db().await;
        let repo = db.products();

        let product = sample_product("Walnut Desk Organizer", 2499);
        repo.insert(&product).await.unwrap();

        let found = repo.get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(found.name, "Walnut Desk Organizer");
        assert_eq!(found.price_cents, 2499);
        assert_eq!(found.description, product.description);
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let db = test_db().await;
        let missing = db.products().get_by_id("nope").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_list_all_sorted_by_name() {
        let db = test_db().await;
        let repo = db.products();

        repo.insert(&sample_product("Zebra Notebook", 500)).await.unwrap();
        repo.insert(&sample_product("Anvil", 9999)).await.unwrap();

        let products = repo.list_all().await.unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].name, "Anvil");
    }

    #[tokio::test]
    async fn test_update_price() {
        let db = test_db().await;
        let repo = db.products();

        let product = sample_product("Anvil", 9999);
        repo.insert(&product).await.unwrap();

        repo.update_price(&product.id, 8888).await.unwrap();
        let found = repo.get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(found.price_cents, 8888);
    }

    #[tokio::test]
    async fn test_delete() {
        let db = test_db().await;
        let repo = db.products();

        let product = sample_product("Anvil", 9999);
        repo.insert(&product).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 1);

        repo.delete(&product.id).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 0);

        let err = repo.delete(&product.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
