use crate::{
    cart::Cart,
    checkout::PricedCart,
    db_types::{CustomerId, NewOrder, Order},
    traits::{CartGuard, StoreError},
};

/// Versioned cart storage.
///
/// Every cart carries a `version`. A save only succeeds if the stored version still equals the version that was
/// loaded, and it bumps the stored version by one. Otherwise the save fails with [`StoreError::VersionConflict`] and
/// nothing is written.
///
/// Callers that load, change and save a cart hold the guard from [`CartManagement::lock_cart`] for the whole cycle.
#[allow(async_fn_in_trait)]
pub trait CartManagement {
    /// Fetches the cart of the given customer, or `None` if there is no such customer.
    async fn fetch_cart(&self, customer_id: CustomerId) -> Result<Option<Cart>, StoreError>;

    /// Replaces the stored cart items with `cart.items`, guarded by `cart.version`.
    ///
    /// Returns the cart as stored, carrying its new version.
    async fn save_cart(&self, customer_id: CustomerId, cart: &Cart) -> Result<Cart, StoreError>;

    /// Fetches the cart joined against the live catalog, plus the customer's current address.
    /// Lines whose product has been deleted have no price.
    async fn fetch_priced_cart(&self, customer_id: CustomerId) -> Result<Option<PricedCart>, StoreError>;

    /// In one transaction: checks and bumps the cart version read in `cart`, inserts `order` with its lines, and
    /// empties the cart.
    async fn checkout(&self, cart: &PricedCart, order: NewOrder) -> Result<Order, StoreError>;

    /// Waits for exclusive use of the customer's cart among callers sharing this backend. The version check still
    /// guards against writers that bypass the lock.
    async fn lock_cart(&self, _customer_id: CustomerId) -> CartGuard {
        CartGuard::unlocked()
    }
}
