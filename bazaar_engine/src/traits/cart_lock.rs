use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::db_types::CustomerId;

/// Exclusive access to one customer's cart. The cart is unlocked when the guard is dropped.
#[derive(Debug)]
pub struct CartGuard(Option<OwnedMutexGuard<()>>);

impl CartGuard {
    /// A guard that excludes nothing. Concurrent writers then rely on the cart version alone.
    pub fn unlocked() -> Self {
        Self(None)
    }
}

/// Per-customer cart locks. Clones share the same set of locks.
#[derive(Debug, Clone, Default)]
pub struct CartLocks {
    locks: Arc<Mutex<HashMap<CustomerId, Arc<AsyncMutex<()>>>>>,
}

impl CartLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other holder has the cart of `customer_id`.
    pub async fn lock(&self, customer_id: CustomerId) -> CartGuard {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            // Only the map holds idle locks
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(customer_id).or_default().clone()
        };
        CartGuard(Some(lock.lock_owned().await))
    }
}
