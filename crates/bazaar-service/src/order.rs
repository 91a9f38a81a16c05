//! # Order Service
//!
//! Turns a customer's cart into a persisted, immutable order.
//!
//! ## Order Placement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      place_order(customer_id)                           │
//! │                                                                         │
//! │  0. customer exists?            no → NotFound("customer")               │
//! │  ── acquire per-customer lock ─────────────────────────────────────     │
//! │  1. load cart (get-or-create)                                           │
//! │  2. cart empty?                 yes → EmptyCart, nothing written        │
//! │  3. resolve every product       miss → NotFound("product"), nothing     │
//! │                                        written, no partial order        │
//! │  4. snapshot lines, sum total   (exact integer-cent arithmetic)         │
//! │  5. persist order + lines       ◄── DURABILITY POINT (one transaction)  │
//! │  6. publish "order created"     failure → logged, NEVER fails the call  │
//! │  7. clear the cart              failure → CartNotCleared{order}         │
//! │  ── release lock ──────────────────────────────────────────────────     │
//! │                                                                         │
//! │  Steps 1-3 are validation: they leave no persisted state behind.        │
//! │  Once step 5 returns, the order exists no matter what happens later.    │
//! │  The lock makes the read-then-clear span atomic per customer: a         │
//! │  concurrent call serializes behind it, finds an empty cart, and         │
//! │  fails at step 2 instead of duplicating the order.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{ServiceError, ServiceResult};
use crate::locks::CustomerLocks;
use bazaar_core::{Money, Order, OrderLine};
use bazaar_db::{CartRepository, CustomerRepository, OrderRepository, ProductRepository};
use bazaar_events::EventPublisher;

/// Order operations.
#[derive(Debug, Clone)]
pub struct OrderService {
    orders: OrderRepository,
    carts: CartRepository,
    catalog: ProductRepository,
    customers: CustomerRepository,
    publisher: EventPublisher,
    locks: Arc<CustomerLocks>,
}

impl OrderService {
    /// Creates a new OrderService over the given collaborators.
    pub fn new(
        orders: OrderRepository,
        carts: CartRepository,
        catalog: ProductRepository,
        customers: CustomerRepository,
        publisher: EventPublisher,
        locks: Arc<CustomerLocks>,
    ) -> Self {
        OrderService {
            orders,
            carts,
            catalog,
            customers,
            publisher,
            locks,
        }
    }

    /// Creates an order from the customer's current cart.
    ///
    /// Returns the persisted order exactly as stored, with its assigned id.
    /// See the module docs for the step sequence and failure policy.
    pub async fn place_order(&self, customer_id: &str) -> ServiceResult<Order> {
        if !self.customers.exists(customer_id).await? {
            return Err(ServiceError::not_found("customer", customer_id));
        }

        // Single writer per customer from the cart read to the cart clear.
        let _guard = self.locks.acquire(customer_id).await;

        let cart = self.carts.get_or_create(customer_id).await?;

        if cart.is_empty() {
            return Err(ServiceError::EmptyCart {
                customer_id: customer_id.to_string(),
            });
        }

        // Snapshot current catalog values into order lines. Any missing
        // product aborts the whole placement before anything is written.
        let mut lines = Vec::with_capacity(cart.lines.len());
        let mut total = Money::zero();
        for cart_line in &cart.lines {
            let product = self
                .catalog
                .get_by_id(&cart_line.product_id)
                .await?
                .ok_or_else(|| ServiceError::not_found("product", &cart_line.product_id))?;

            let line = OrderLine::from_product(&product, cart_line.quantity);
            total += line.line_total();
            lines.push(line);
        }

        // Durability point: order and lines in one transaction.
        let order = self
            .orders
            .create(customer_id, lines, total.cents())
            .await?;

        // Best-effort notification. The order already exists; a broker
        // problem is logged and swallowed.
        if let Err(err) = self.publisher.publish_order_created(&order).await {
            warn!(order_id = %order.id, error = %err, "Order event publish failed");
        }

        // Post-commit cleanup. A failure here must be distinguishable from
        // a placement failure: the caller holds a created order and must
        // not retry against the still-full cart.
        if let Err(err) = self.carts.clear_lines(&cart.id).await {
            warn!(order_id = %order.id, customer_id = %customer_id, error = %err, "Order created but cart not cleared");
            return Err(ServiceError::CartNotCleared {
                order: Box::new(order),
                source: err,
            });
        }

        info!(
            order_id = %order.id,
            customer_id = %customer_id,
            total = %order.total(),
            lines = order.lines.len(),
            "Order placed"
        );

        Ok(order)
    }

    /// Gets an order by id.
    pub async fn get_order(&self, order_id: &str) -> ServiceResult<Order> {
        self.orders
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("order", order_id))
    }

    /// Lists all orders. An empty list is a normal result, not an error.
    pub async fn list_orders(&self) -> ServiceResult<Vec<Order>> {
        Ok(self.orders.list_all().await?)
    }

    /// Lists one customer's orders, oldest first.
    pub async fn orders_for_customer(&self, customer_id: &str) -> ServiceResult<Vec<Order>> {
        Ok(self.orders.list_by_customer(customer_id).await?)
    }

    /// Deletes an order by id.
    ///
    /// Nothing else changes: the customer's order history is a store query,
    /// so there is no back-reference to fix up.
    pub async fn delete_order(&self, order_id: &str) -> ServiceResult<()> {
        self.orders.delete(order_id).await?;
        info!(order_id = %order_id, "Order deleted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customer::NewCustomer;
    use crate::product::NewProduct;
    use crate::Services;
    use bazaar_core::OrderStatus;
    use bazaar_db::{Database, DbConfig};
    use bazaar_events::{EventPublisher, PublisherConfig};
    use std::time::Duration;

    /// Services over an in-memory store, with one customer and two products:
    /// Product A at 10.00 and Product B at 5.00.
    async fn setup() -> (Services, String, String, String) {
        setup_with_publisher(EventPublisher::disabled()).await
    }

    async fn setup_with_publisher(
        publisher: EventPublisher,
    ) -> (Services, String, String, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let services = Services::new(&db, publisher);

        let customer = services
            .customers
            .create(NewCustomer {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                phone_number: None,
                address: None,
            })
            .await
            .unwrap();

        let product_a = services
            .products
            .create(NewProduct {
                name: "Product A".to_string(),
                description: Some("First".to_string()),
                price_cents: 1000,
            })
            .await
            .unwrap();

        let product_b = services
            .products
            .create(NewProduct {
                name: "Product B".to_string(),
                description: None,
                price_cents: 500,
            })
            .await
            .unwrap();

        (services, customer.id, product_a.id, product_b.id)
    }

    #[tokio::test]
    async fn test_place_order_snapshots_and_totals() {
        let (services, customer, product_a, product_b) = setup().await;

        // Cart: 2 x A @ 10.00, 1 x B @ 5.00
        services.carts.add_line(&customer, &product_a, 2).await.unwrap();
        services.carts.add_line(&customer, &product_b, 1).await.unwrap();

        let order = services.orders.place_order(&customer).await.unwrap();

        assert_eq!(order.status, OrderStatus::Created);
        assert_eq!(order.total_cents, 2500);
        assert_eq!(order.lines.len(), 2);
        assert_eq!(order.lines[0].product_name, "Product A");
        assert_eq!(order.lines[0].unit_price_cents, 1000);
        assert_eq!(order.lines[1].product_name, "Product B");
        assert_eq!(order.lines[1].unit_price_cents, 500);

        // Stored total equals the recomputed sum of line extensions
        let stored = services.orders.get_order(&order.id).await.unwrap();
        assert_eq!(stored.lines_total(), stored.total());

        // The cart is empty afterwards
        let cart = services.carts.get_cart(&customer).await.unwrap();
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_place_order_empty_cart_fails_cleanly() {
        let (services, customer, _, _) = setup().await;

        let err = services.orders.place_order(&customer).await.unwrap_err();
        assert!(matches!(err, ServiceError::EmptyCart { .. }));

        // Nothing was persisted
        assert!(services.orders.list_orders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_place_order_unknown_customer() {
        let (services, _, _, _) = setup().await;

        let err = services.orders.place_order("ghost").await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::NotFound { ref entity, .. } if entity == "customer"
        ));
    }

    #[tokio::test]
    async fn test_place_order_with_vanished_product_persists_nothing() {
        let (services, customer, product_a, product_b) = setup().await;

        services.carts.add_line(&customer, &product_a, 1).await.unwrap();
        services.carts.add_line(&customer, &product_b, 1).await.unwrap();

        // The product disappears from the catalog after it entered the cart
        services.products.delete(&product_b).await.unwrap();

        let err = services.orders.place_order(&customer).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::NotFound { ref entity, .. } if entity == "product"
        ));

        // No partial order, and the cart is untouched for the caller to fix
        assert!(services.orders.list_orders().await.unwrap().is_empty());
        let cart = services.carts.get_cart(&customer).await.unwrap();
        assert_eq!(cart.line_count(), 2);
    }

    #[tokio::test]
    async fn test_placed_order_ignores_later_price_changes() {
        let (services, customer, product_a, _) = setup().await;

        services.carts.add_line(&customer, &product_a, 2).await.unwrap();
        let order = services.orders.place_order(&customer).await.unwrap();
        assert_eq!(order.total_cents, 2000);

        services.products.update_price(&product_a, 9999).await.unwrap();

        let stored = services.orders.get_order(&order.id).await.unwrap();
        assert_eq!(stored.lines[0].unit_price_cents, 1000);
        assert_eq!(stored.total_cents, 2000);
    }

    #[tokio::test]
    async fn test_many_small_lines_total_is_exact() {
        let (services, customer, _, _) = setup().await;

        // 7 products at 0.10 each, quantity 3: total must be exactly 2.10
        for i in 0..7 {
            let product = services
                .products
                .create(NewProduct {
                    name: format!("Penny Item {}", i),
                    description: None,
                    price_cents: 10,
                })
                .await
                .unwrap();
            services.carts.add_line(&customer, &product.id, 3).await.unwrap();
        }

        let order = services.orders.place_order(&customer).await.unwrap();
        assert_eq!(order.total_cents, 210);
        assert_eq!(order.lines_total().cents(), 210);
    }

    #[tokio::test]
    async fn test_concurrent_place_order_creates_exactly_one_order() {
        let (services, customer, product_a, _) = setup().await;

        services.carts.add_line(&customer, &product_a, 2).await.unwrap();

        let first = {
            let orders = services.orders.clone();
            let customer = customer.clone();
            tokio::spawn(async move { orders.place_order(&customer).await })
        };
        let second = {
            let orders = services.orders.clone();
            let customer = customer.clone();
            tokio::spawn(async move { orders.place_order(&customer).await })
        };

        let results = [first.await.unwrap(), second.await.unwrap()];
        let oks = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(oks, 1, "exactly one call may win the cart");

        let loser = results.iter().find(|r| r.is_err()).unwrap();
        assert!(matches!(
            loser.as_ref().unwrap_err(),
            ServiceError::EmptyCart { .. }
        ));

        assert_eq!(services.orders.list_orders().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_publish_failure_does_not_fail_placement() {
        // Nothing listens on this port; every publish attempt fails
        let publisher = EventPublisher::new(
            PublisherConfig::with_url("redis://127.0.0.1:1/")
                .publish_timeout(Duration::from_millis(300)),
        )
        .unwrap();
        let (services, customer, product_a, _) = setup_with_publisher(publisher).await;

        services.carts.add_line(&customer, &product_a, 1).await.unwrap();

        let order = services.orders.place_order(&customer).await.unwrap();

        // Order persisted and cart cleared despite the broker being down
        assert!(services.orders.get_order(&order.id).await.is_ok());
        assert!(services.carts.get_cart(&customer).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_list_delete_order() {
        let (services, customer, product_a, _) = setup().await;

        services.carts.add_line(&customer, &product_a, 1).await.unwrap();
        let order = services.orders.place_order(&customer).await.unwrap();

        assert_eq!(services.orders.list_orders().await.unwrap().len(), 1);
        assert_eq!(
            services
                .orders
                .orders_for_customer(&customer)
                .await
                .unwrap()
                .len(),
            1
        );

        services.orders.delete_order(&order.id).await.unwrap();

        let err = services.orders.get_order(&order.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));

        let err = services.orders.delete_order(&order.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));

        // The history index follows the store
        assert!(services
            .orders
            .orders_for_customer(&customer)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_cart_usable_again_after_order() {
        let (services, customer, product_a, product_b) = setup().await;

        services.carts.add_line(&customer, &product_a, 1).await.unwrap();
        services.orders.place_order(&customer).await.unwrap();

        // The same customer can start a new cart immediately
        services.carts.add_line(&customer, &product_b, 4).await.unwrap();
        let order = services.orders.place_order(&customer).await.unwrap();
        assert_eq!(order.total_cents, 2000);

        assert_eq!(services.orders.list_orders().await.unwrap().len(), 2);
    }
}
