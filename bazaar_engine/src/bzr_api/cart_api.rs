use std::{fmt::Debug, time::Duration};

use log::*;
use rand::Rng;

use crate::{
    bzr_api::errors::CartApiError,
    cart::{Cart, CartError, QtyAction},
    db_types::{CustomerId, ProductId},
    traits::{CartManagement, CatalogManagement, StoreError},
};

/// How many times a cart mutation is re-applied after losing an optimistic concurrency race.
pub const MAX_CART_RETRIES: usize = 5;
/// Upper bound of the random pause before the n-th retry is `n` times this.
const RETRY_BACKOFF_MS: u64 = 10;

/// Sleeps for a random interval that grows with the attempt number.
pub(crate) async fn backoff(attempt: usize) {
    let ceiling = RETRY_BACKOFF_MS * attempt as u64;
    let delay = Duration::from_millis(rand::thread_rng().gen_range(1..=ceiling.max(1)));
    tokio::time::sleep(delay).await;
}

/// `CartApi` applies the cart engine operations to stored carts.
///
/// Every mutation is a read-modify-write cycle. Mutations of the same cart wait for each other on the backend's cart
/// lock. The cart version still guards the save: if another writer got in first, the cart is re-read and the
/// mutation re-applied after a short random pause, up to [`MAX_CART_RETRIES`] times.
pub struct CartApi<B> {
    db: B,
}

impl<B> Debug for CartApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CartApi")
    }
}

impl<B> CartApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> CartApi<B>
where B: CartManagement + CatalogManagement
{
    pub async fn view_cart(&self, customer_id: CustomerId) -> Result<Cart, CartApiError> {
        self.db.fetch_cart(customer_id).await?.ok_or(CartApiError::CustomerNotFound(customer_id))
    }

    /// Adds `qty` units of a catalog product to the cart, merging with an existing line for the same product.
    pub async fn add_item(&self, customer_id: CustomerId, product_id: ProductId, qty: i64) -> Result<Cart, CartApiError> {
        if qty < 1 {
            return Err(CartError::InvalidQuantity(qty).into());
        }
        if self.db.fetch_product(product_id).await?.is_none() {
            debug!("🛒️ {customer_id} tried to add unknown {product_id} to their cart");
            return Err(CartApiError::ProductNotFound(product_id));
        }
        let cart = self.mutate(customer_id, |cart| cart.add_item(product_id, qty)).await?;
        debug!("🛒️ {customer_id} added {qty} x {product_id}. The cart has {} lines", cart.len());
        Ok(cart)
    }

    pub async fn adjust_qty(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
        action: QtyAction,
    ) -> Result<Cart, CartApiError> {
        let cart = self.mutate(customer_id, |cart| cart.adjust_qty(product_id, action)).await?;
        debug!("🛒️ {customer_id} applied {action:?} to {product_id}");
        Ok(cart)
    }

    /// Removing a product that is not in the cart succeeds and leaves the items unchanged.
    pub async fn remove_item(&self, customer_id: CustomerId, product_id: ProductId) -> Result<Cart, CartApiError> {
        let cart = self
            .mutate(customer_id, |cart| {
                cart.remove_item(product_id);
                Ok(())
            })
            .await?;
        debug!("🛒️ {customer_id} removed {product_id} from their cart");
        Ok(cart)
    }

    async fn mutate<F>(&self, customer_id: CustomerId, f: F) -> Result<Cart, CartApiError>
    where F: Fn(&mut Cart) -> Result<(), CartError> {
        let _guard = self.db.lock_cart(customer_id).await;
        for attempt in 1..=MAX_CART_RETRIES {
            let mut cart = self.db.fetch_cart(customer_id).await?.ok_or(CartApiError::CustomerNotFound(customer_id))?;
            f(&mut cart)?;
            match self.db.save_cart(customer_id, &cart).await {
                Ok(saved) => return Ok(saved),
                Err(StoreError::VersionConflict) => {
                    trace!("🛒️ Cart for {customer_id} changed underneath us (attempt {attempt}). Retrying");
                    if attempt < MAX_CART_RETRIES {
                        backoff(attempt).await;
                    }
                },
                Err(e) => return Err(e.into()),
            }
        }
        warn!("🛒️ Cart for {customer_id} is too contended. Gave up after {MAX_CART_RETRIES} attempts");
        Err(CartApiError::Conflict(MAX_CART_RETRIES))
    }
}
