//! # Storage backend contracts
//!
//! These traits define the behaviour a storage backend must expose to act as the Bazaar store. The public APIs in
//! [`crate::bzr_api`] are generic over them, so the HTTP layer never talks to a database directly.
//!
//! * [`CatalogManagement`] covers products: browsing with a [`crate::catalog::ProductQuery`] and merchant edits.
//! * [`CartManagement`] loads and saves versioned carts, and performs the atomic cart-to-order checkout. Backends that
//!   serve many requests hand out per-customer [`CartGuard`]s so that cart updates queue instead of racing.
//! * [`OrderManagement`] queries placed orders.
//! * [`AccountManagement`] stores customers, merchants and admins.
//!
//! Lookups return `Option` when the record may legitimately be absent. Every method fails with a [`StoreError`].
mod account_management;
mod cart_lock;
mod cart_management;
mod catalog_management;
mod order_management;
mod store_error;

pub use account_management::AccountManagement;
pub use cart_lock::{CartGuard, CartLocks};
pub use cart_management::CartManagement;
pub use catalog_management::CatalogManagement;
pub use order_management::OrderManagement;
pub use store_error::StoreError;
