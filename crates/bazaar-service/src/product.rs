//! # Product Service
//!
//! Catalog CRUD plus the best-effort "product created" notification.

use chrono::Utc;
use tracing::{info, warn};

use crate::error::{ServiceError, ServiceResult};
use bazaar_core::{validation, Product};
use bazaar_db::repository::product::generate_product_id;
use bazaar_db::ProductRepository;
use bazaar_events::EventPublisher;

/// Input for creating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
}

/// Catalog operations.
#[derive(Debug, Clone)]
pub struct ProductService {
    catalog: ProductRepository,
    publisher: EventPublisher,
}

impl ProductService {
    /// Creates a new ProductService over the given collaborators.
    pub fn new(catalog: ProductRepository, publisher: EventPublisher) -> Self {
        ProductService { catalog, publisher }
    }

    /// Creates a product and notifies the product stream.
    ///
    /// Validation happens before the write; the notification happens after
    /// and its failure is logged, never surfaced.
    pub async fn create(&self, new: NewProduct) -> ServiceResult<Product> {
        validation::validate_product_name(&new.name)?;
        validation::validate_price_cents(new.price_cents)?;

        let now = Utc::now();
        let product = Product {
            id: generate_product_id(),
            name: new.name.trim().to_string(),
            description: new.description,
            price_cents: new.price_cents,
            created_at: now,
            updated_at: now,
        };

        let product = self.catalog.insert(&product).await?;

        if let Err(err) = self.publisher.publish_product_created(&product).await {
            warn!(product_id = %product.id, error = %err, "Product event publish failed");
        }

        info!(product_id = %product.id, name = %product.name, "Product created");

        Ok(product)
    }

    /// Gets a product by id.
    pub async fn get(&self, id: &str) -> ServiceResult<Product> {
        self.catalog
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("product", id))
    }

    /// Lists all products.
    pub async fn list(&self) -> ServiceResult<Vec<Product>> {
        Ok(self.catalog.list_all().await?)
    }

    /// Changes a product's current price.
    ///
    /// Only future orders see the new price; placed orders keep their
    /// snapshots.
    pub async fn update_price(&self, id: &str, price_cents: i64) -> ServiceResult<()> {
        validation::validate_price_cents(price_cents)?;
        self.catalog.update_price(id, price_cents).await?;
        info!(product_id = %id, price_cents = %price_cents, "Product price updated");
        Ok(())
    }

    /// Deletes a product from the catalog.
    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        self.catalog.delete(id).await?;
        info!(product_id = %id, "Product deleted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
