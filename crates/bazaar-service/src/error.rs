//! # Service Error Types
//!
//! The error surface a controller layer maps onto wire status codes.
//!
//! ## Classification
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Service Error Kinds                                │
//! │                                                                         │
//! │  NotFound        customer / product / order / cart line absent          │
//! │  InvalidArgument non-positive quantity, malformed input                 │
//! │  EmptyCart       order creation attempted on an empty cart              │
//! │  CartNotCleared  the order EXISTS but post-commit cart cleanup failed;  │
//! │                  callers must NOT retry order placement                 │
//! │  Unavailable     a store could not be reached within its timeout        │
//! │  Store           a query ran and failed                                 │
//! │                                                                         │
//! │  Validation-stage errors (the first three) are detected before any     │
//! │  durable write and leave no persisted state behind.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use bazaar_core::{CoreError, Order, ValidationError};
use bazaar_db::DbError;

/// Errors returned by the service layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Caller input failed validation. Nothing was written.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] ValidationError),

    /// Order creation was attempted on a cart with zero lines.
    /// No order was created.
    #[error("cart for customer {customer_id} is empty")]
    EmptyCart { customer_id: String },

    /// The order was persisted, but clearing the cart afterwards failed.
    ///
    /// This is NOT an order-creation failure: the order in this variant
    /// exists and is durable. Retrying the placement against the uncleared
    /// cart would duplicate it; callers should clear the cart instead.
    #[error("order was created but clearing the cart failed: {source}")]
    CartNotCleared { order: Box<Order>, source: DbError },

    /// A collaborator store could not be reached within its timeout.
    #[error("store unavailable: {0}")]
    Unavailable(DbError),

    /// A storage operation ran and failed.
    #[error("store error: {0}")]
    Store(DbError),
}

impl ServiceError {
    /// Creates a NotFound error.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        ServiceError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

/// Classifies database errors: reachability problems become `Unavailable`,
/// row absence keeps its NotFound shape, everything else is `Store`.
impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        if err.is_unavailable() {
            return ServiceError::Unavailable(err);
        }

        match err {
            DbError::NotFound { entity, id } => ServiceError::NotFound {
                entity: entity.to_lowercase(),
                id,
            },
            other => ServiceError::Store(other),
        }
    }
}

/// Domain errors from pure cart logic.
impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::LineNotFound { product_id } => {
                ServiceError::not_found("cart line", product_id)
            }
            CoreError::Validation(v) => ServiceError::InvalidArgument(v),
        }
    }
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_not_found_maps_to_not_found() {
        let err: ServiceError = DbError::not_found("Order", "o1").into();
        assert!(matches!(
            err,
            ServiceError::NotFound { ref entity, ref id } if entity == "order" && id == "o1"
        ));
    }

    #[test]
    fn test_db_unavailability_maps_to_unavailable() {
        let err: ServiceError = DbError::PoolExhausted.into();
        assert!(matches!(err, ServiceError::Unavailable(_)));

        let err: ServiceError = DbError::ConnectionFailed("refused".to_string()).into();
        assert!(matches!(err, ServiceError::Unavailable(_)));
    }

    #[test]
    fn test_core_line_not_found_maps_to_not_found() {
        let err: ServiceError = CoreError::LineNotFound {
            product_id: "p1".to_string(),
        }
        .into();
        assert!(matches!(
            err,
            ServiceError::NotFound { ref entity, .. } if entity == "cart line"
        ));
    }
}
