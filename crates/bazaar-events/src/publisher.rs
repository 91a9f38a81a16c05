//! # Event Publisher
//!
//! Publishes created orders and products to Redis pub/sub channels.
//!
//! ## Contract
//! - Publishing happens strictly AFTER the entity is durable in the store.
//! - A publish failure is reported to the caller, who logs and continues;
//!   it never rolls back or fails the surrounding operation.
//! - Every attempt is bounded by the configured timeout, so a hung broker
//!   cannot stall order placement.

use redis::AsyncCommands;
use tracing::debug;

use crate::config::PublisherConfig;
use crate::error::{PublishError, PublishResult};
use bazaar_core::{Order, Product};

/// Fire-and-forget publisher of domain events.
///
/// Constructed once at startup and cloned into the services. When no broker
/// URL is configured the publisher is disabled and every publish is a
/// logged no-op, which keeps the event concern out of tests and
/// broker-less deployments.
#[derive(Debug, Clone)]
pub struct EventPublisher {
    client: Option<redis::Client>,
    config: PublisherConfig,
}

impl EventPublisher {
    /// Creates a publisher from the given configuration.
    ///
    /// The connection itself is lazy; an unreachable broker surfaces on the
    /// first publish attempt, not here.
    pub fn new(config: PublisherConfig) -> PublishResult<Self> {
        let client = match &config.redis_url {
            Some(url) => Some(redis::Client::open(url.as_str())?),
            None => None,
        };

        Ok(EventPublisher { client, config })
    }

    /// Creates a publisher that drops every event.
    pub fn disabled() -> Self {
        EventPublisher {
            client: None,
            config: PublisherConfig::disabled(),
        }
    }

    /// True when a broker is configured.
    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    /// Publishes a created order to the orders channel.
    pub async fn publish_order_created(&self, order: &Order) -> PublishResult<()> {
        let payload = serde_json::to_string(order)?;
        self.publish(&self.config.orders_channel, &payload).await
    }

    /// Publishes a created product to the products channel.
    pub async fn publish_product_created(&self, product: &Product) -> PublishResult<()> {
        let payload = serde_json::to_string(product)?;
        self.publish(&self.config.products_channel, &payload).await
    }

    /// Connects and PUBLISHes within the configured timeout.
    async fn publish(&self, channel: &str, payload: &str) -> PublishResult<()> {
        let Some(client) = &self.client else {
            debug!(channel = %channel, "Publishing disabled, dropping event");
            return Ok(());
        };

        let timeout = self.config.publish_timeout;

        let attempt = async {
            let mut conn = client.get_multiplexed_async_connection().await?;
            let receivers: i64 = conn.publish(channel, payload).await?;
            Ok::<i64, PublishError>(receivers)
        };

        match tokio::time::timeout(timeout, attempt).await {
            Ok(Ok(receivers)) => {
                debug!(channel = %channel, receivers = %receivers, "Event published");
                Ok(())
            }
            Ok(Err(err)) => Err(err),
            Err(_) => Err(PublishError::Timeout(timeout)),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_core::{OrderLine, OrderStatus};
    use chrono::Utc;
    use std::time::Duration;

    fn sample_order() -> Order {
        Order {
            id: "o1".to_string(),
            customer_id: "c1".to_string(),
            status: OrderStatus::Created,
            total_cents: 2500,
            lines: vec![OrderLine {
                product_id: "p1".to_string(),
                product_name: "Product A".to_string(),
                product_description: None,
                quantity: 2,
                unit_price_cents: 1000,
            }],
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_disabled_publisher_is_a_noop() {
        let publisher = EventPublisher::disabled();
        assert!(!publisher.is_enabled());

        publisher.publish_order_created(&sample_order()).await.unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_broker_reports_error() {
        // Nothing listens on this port; the connect attempt must fail or
        // time out, and either way publish returns an error instead of
        // hanging.
        let config = PublisherConfig::with_url("redis://127.0.0.1:1/")
            .publish_timeout(Duration::from_millis(500));
        let publisher = EventPublisher::new(config).unwrap();
        assert!(publisher.is_enabled());

        let result = publisher.publish_order_created(&sample_order()).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_order_payload_shape() {
        let payload = serde_json::to_string(&sample_order()).unwrap();
        assert!(payload.contains("\"status\":\"CREATED\""));
        assert!(payload.contains("\"total_cents\":2500"));
    }
}
