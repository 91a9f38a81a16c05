//! # Per-Customer Lock Registry
//!
//! A single-writer queue keyed by customer id.
//!
//! ## Why This Exists
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              Two Concurrent place_order(C1) Calls                       │
//! │                                                                         │
//! │  Without the lock:                With the lock:                        │
//! │                                                                         │
//! │  A: read cart  [2 lines]          A: acquire(C1)                        │
//! │  B: read cart  [2 lines]          A: read cart [2 lines]                │
//! │  A: persist order #1              A: persist order #1                   │
//! │  B: persist order #2  ❌          A: clear cart, release                │
//! │  A: clear cart                    B: acquire(C1)                        │
//! │  B: clear cart                    B: read cart [0 lines]                │
//! │                                   B: fails "empty cart"  ✅             │
//! │                                                                         │
//! │  Same duplicate-loss applies to interleaved add_line/remove_line        │
//! │  read-modify-write cycles.                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The registry hands out one async mutex per customer id. Guards are held
//! across await points, so `tokio::sync::Mutex` is required here, not the
//! std one. Entries are a handful of bytes each and are reused for the
//! customer's whole lifetime, so the map is never pruned.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of per-customer mutexes.
///
/// All services that touch a customer's cart share one registry instance,
/// so cart mutations and order placement serialize against each other.
#[derive(Debug, Default)]
pub struct CustomerLocks {
    inner: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl CustomerLocks {
    /// Creates an empty registry.
    pub fn new() -> Self {
        CustomerLocks {
            inner: StdMutex::new(HashMap::new()),
        }
    }

    /// Acquires the lock for a customer, waiting behind earlier holders.
    ///
    /// The returned guard releases the lock on drop.
    pub async fn acquire(&self, customer_id: &str) -> OwnedMutexGuard<()> {
        let mutex = {
            let mut map = self.inner.lock().expect("customer lock registry poisoned");
            Arc::clone(
                map.entry(customer_id.to_string())
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };
        mutex.lock_owned().await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
