//! # bazaar-events: Broker Notifications for Bazaar
//!
//! Fire-and-forget notifications of created orders and products, published
//! as JSON to Redis pub/sub channels.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Event Publishing Flow                              │
//! │                                                                         │
//! │  bazaar-service                                                        │
//! │       │                                                                 │
//! │       │  1. order persisted (durability point, in bazaar-db)           │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  bazaar-events (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │  2. serialize order to JSON                                    │   │
//! │  │  3. PUBLISH orders <payload>   (bounded by publish timeout)    │   │
//! │  │                                                                 │   │
//! │  │  On ANY failure: return the error to the caller, who logs it   │   │
//! │  │  and moves on. The order already exists; the event is a        │   │
//! │  │  notification, not a consistency requirement.                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Redis ──► downstream consumers (fulfillment, search indexing, ...)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`config`] - Publisher configuration (URL, channels, timeout)
//! - [`publisher`] - The `EventPublisher` itself
//! - [`error`] - Publish error types

pub mod config;
pub mod error;
pub mod publisher;

pub use config::PublisherConfig;
pub use error::PublishError;
pub use publisher::EventPublisher;
