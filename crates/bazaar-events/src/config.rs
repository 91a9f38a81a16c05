//! Publisher configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults. A missing `REDIS_URL` yields a disabled publisher: useful for
//! tests and for deployments that have not wired a broker yet.

use std::env;
use std::time::Duration;

/// Default bound on a single publish attempt.
const DEFAULT_PUBLISH_TIMEOUT_MS: u64 = 2_000;

/// Event publisher configuration.
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    /// Redis connection string. `None` disables publishing entirely.
    pub redis_url: Option<String>,

    /// Channel for order-created events.
    pub orders_channel: String,

    /// Channel for product-created events.
    pub products_channel: String,

    /// Upper bound on a single publish attempt (connect + PUBLISH).
    pub publish_timeout: Duration,
}

impl PublisherConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable                   | Default   |
    /// |----------------------------|-----------|
    /// | `REDIS_URL`                | disabled  |
    /// | `EVENTS_ORDERS_CHANNEL`    | `orders`  |
    /// | `EVENTS_PRODUCTS_CHANNEL`  | `products`|
    /// | `EVENTS_PUBLISH_TIMEOUT_MS`| `2000`    |
    pub fn from_env() -> Self {
        let publish_timeout_ms = env::var("EVENTS_PUBLISH_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PUBLISH_TIMEOUT_MS);

        PublisherConfig {
            redis_url: env::var("REDIS_URL").ok(),
            orders_channel: env::var("EVENTS_ORDERS_CHANNEL")
                .unwrap_or_else(|_| "orders".to_string()),
            products_channel: env::var("EVENTS_PRODUCTS_CHANNEL")
                .unwrap_or_else(|_| "products".to_string()),
            publish_timeout: Duration::from_millis(publish_timeout_ms),
        }
    }

    /// A configuration that never touches a broker.
    pub fn disabled() -> Self {
        PublisherConfig {
            redis_url: None,
            orders_channel: "orders".to_string(),
            products_channel: "products".to_string(),
            publish_timeout: Duration::from_millis(DEFAULT_PUBLISH_TIMEOUT_MS),
        }
    }

    /// Points the publisher at a specific broker URL.
    pub fn with_url(url: impl Into<String>) -> Self {
        PublisherConfig {
            redis_url: Some(url.into()),
            ..PublisherConfig::disabled()
        }
    }

    /// Overrides the publish timeout.
    pub fn publish_timeout(mut self, timeout: Duration) -> Self {
        self.publish_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_defaults() {
        let config = PublisherConfig::disabled();
        assert!(config.redis_url.is_none());
        assert_eq!(config.orders_channel, "orders");
        assert_eq!(config.products_channel, "products");
        assert_eq!(config.publish_timeout, Duration::from_millis(2_000));
    }

    #[test]
    fn test_with_url() {
        let config = PublisherConfig::with_url("redis://localhost:6379")
            .publish_timeout(Duration::from_millis(250));
        assert_eq!(config.redis_url.as_deref(), Some("redis://localhost:6379"));
        assert_eq!(config.publish_timeout, Duration::from_millis(250));
    }
}
