//! # Customer Repository
//!
//! Database operations for customers.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use bazaar_core::Customer;

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Inserts a new customer.
    pub async fn insert(&self, customer: &Customer) -> DbResult<Customer> {
        debug!(id = %customer.id, "Inserting customer");

        sqlx::query(
            r#"
            INSERT INTO customers (
                id, name, email, phone_number, address, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone_number)
        .bind(&customer.address)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(customer.clone())
    }

    /// Gets a customer by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, email, phone_number, address, created_at, updated_at
            FROM customers
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Lists all customers, sorted by name.
    pub async fn list_all(&self) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, email, phone_number, address, created_at, updated_at
            FROM customers
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Checks whether a customer exists.
    pub async fn exists(&self, id: &str) -> DbResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers WHERE id = ?1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    /// Updates an existing customer.
    pub async fn update(&self, customer: &Customer) -> DbResult<()> {
        debug!(id = %customer.id, "Updating customer");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE customers SET
                name = ?2,
                email = ?3,
                phone_number = ?4,
                address = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone_number)
        .bind(&customer.address)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", &customer.id));
        }

        Ok(())
    }

    /// Deletes a customer.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting customer");

        let result = sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(())
    }
}

/// Helper to generate a new customer ID.
pub fn generate_customer_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn sample_customer(name: &str) -> Customer {
        let now = Utc::now();
        Customer {
            id: generate_customer_id(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone_number: None,
            address: Some("12 Harbor Lane".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_get_and_exists() {
        let db = test_db().await;
        let repo = db.customers();

        let customer = sample_customer("Ada");
        repo.insert(&customer).await.unwrap();

        let found = repo.get_by_id(&customer.id).await.unwrap().unwrap();
        assert_eq!(found.email, "ada@example.com");

        assert!(repo.exists(&customer.id).await.unwrap());
        assert!(!repo.exists("ghost").await.unwrap());
    }

    #[tokio::test]
    async fn test_update() {
        let db = test_db().await;
        let repo = db.customers();

        let mut customer = sample_customer("Ada");
        repo.insert(&customer).await.unwrap();

        customer.address = Some("99 New Street".to_string());
        repo.update(&customer).await.unwrap();

        let found = repo.get_by_id(&customer.id).await.unwrap().unwrap();
        assert_eq!(found.address.as_deref(), Some("99 New Street"));
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let db = test_db().await;
        let err = db.customers().update(&sample_customer("Ghost")).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete() {
        let db = test_db().await;
        let repo = db.customers();

        let customer = sample_customer("Ada");
        repo.insert(&customer).await.unwrap();

        repo.delete(&customer.id).await.unwrap();
        assert!(!repo.exists(&customer.id).await.unwrap());

        let err = repo.delete(&customer.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_all() {
        let db = test_db().await;
        let repo = db.customers();

        assert!(repo.list_all().await.unwrap().is_empty());

        repo.insert(&sample_customer("Noor")).await.unwrap();
        repo.insert(&sample_customer("Ada")).await.unwrap();

        let customers = repo.list_all().await.unwrap();
        assert_eq!(customers.len(), 2);
        assert_eq!(customers[0].name, "Ada");
    }
}
