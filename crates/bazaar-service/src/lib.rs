//! # bazaar-service: Orchestration Layer for Bazaar
//!
//! The business operations of the backend, one service per aggregate,
//! collaborators injected at construction.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Service Orchestration                              │
//! │                                                                         │
//! │  Controller layer (out of scope)                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 bazaar-service (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │  ┌──────────────┐  ┌─────────────┐  ┌──────────┐  ┌──────────┐│   │
//! │  │  │ OrderService │  │ CartService │  │ Product  │  │ Customer ││   │
//! │  │  │ place_order  │  │ add_line    │  │ Service  │  │ Service  ││   │
//! │  │  │ get/list/del │  │ remove_line │  │          │  │          ││   │
//! │  │  └──────┬───────┘  └──────┬──────┘  └────┬─────┘  └────┬─────┘│   │
//! │  │         │     shared      │              │             │      │   │
//! │  │         └── CustomerLocks ┘              │             │      │   │
//! │  └─────────┬────────────────────────────────┼─────────────┼──────┘   │
//! │            ▼                                ▼             ▼           │
//! │   bazaar-db repositories            bazaar-events    bazaar-db        │
//! │   (SQLite stores)                   (Redis pub/sub)  (SQLite stores)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wiring
//!
//! ```rust,ignore
//! let db = Database::new(DbConfig::new("./bazaar.db")).await?;
//! let publisher = EventPublisher::new(PublisherConfig::from_env())?;
//! let services = Services::new(&db, publisher);
//!
//! let order = services.orders.place_order(&customer_id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod customer;
pub mod error;
pub mod locks;
pub mod order;
pub mod product;

// =============================================================================
// Re-exports
// =============================================================================

pub use cart::CartService;
pub use customer::{CustomerService, NewCustomer};
pub use error::ServiceError;
pub use locks::CustomerLocks;
pub use order::OrderService;
pub use product::{NewProduct, ProductService};

use std::sync::Arc;

use bazaar_db::Database;
use bazaar_events::EventPublisher;

/// The full set of services, wired over one database and one publisher.
///
/// The cart and order services share a single [`CustomerLocks`] registry so
/// that every cart read-modify-write for a customer, including the one
/// inside order placement, goes through the same per-customer queue.
#[derive(Debug, Clone)]
pub struct Services {
    pub products: ProductService,
    pub customers: CustomerService,
    pub carts: CartService,
    pub orders: OrderService,
}

impl Services {
    /// Wires all services by explicit constructor injection.
    pub fn new(db: &Database, publisher: EventPublisher) -> Self {
        let locks = Arc::new(CustomerLocks::new());

        Services {
            products: ProductService::new(db.products(), publisher.clone()),
            customers: CustomerService::new(db.customers()),
            carts: CartService::new(
                db.carts(),
                db.products(),
                db.customers(),
                Arc::clone(&locks),
            ),
            orders: OrderService::new(
                db.orders(),
                db.carts(),
                db.products(),
                db.customers(),
                publisher,
                locks,
            ),
        }
    }
}
