//! # Repository Module
//!
//! Database repository implementations for Bazaar.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Service call                                                          │
//! │       │                                                                 │
//! │       │  db.orders().get_by_id(&order_id)                              │
//! │       ▼                                                                 │
//! │  OrderRepository                                                       │
//! │  ├── create(&self, customer_id, lines, total_cents)                    │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── list_all(&self)                                                   │
//! │  └── delete(&self, id)                                                 │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Clean separation of concerns                                        │
//! │  • SQL is isolated in one place                                        │
//! │  • Can swap database implementations                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Product catalog CRUD
//! - [`customer::CustomerRepository`] - Customer CRUD and existence checks
//! - [`cart::CartRepository`] - Per-customer carts and their lines
//! - [`order::OrderRepository`] - Immutable order records

pub mod cart;
pub mod customer;
pub mod order;
pub mod product;
