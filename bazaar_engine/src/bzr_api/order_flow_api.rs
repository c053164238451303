use std::fmt::Debug;

use log::*;

use crate::{
    bzr_api::{
        cart_api::{backoff, MAX_CART_RETRIES},
        errors::CartApiError,
    },
    db_types::{CustomerId, MerchantId, Order},
    events::{EventProducers, OrderCreatedEvent},
    traits::{CartManagement, OrderManagement, StoreError},
};

/// `OrderFlowApi` converts carts into orders and answers order queries.
pub struct OrderFlowApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> OrderFlowApi<B>
where B: CartManagement + OrderManagement
{
    /// Checks out the customer's cart.
    ///
    /// The cart is priced against the live catalog, snapshotted into a `Pending` order, and emptied, all in one
    /// store transaction. The cart lock is held throughout. If the cart or its prices change between pricing and
    /// commit the whole checkout is repeated.
    ///
    /// On success, the `OrderCreated` hook subscribers are notified and the new order is returned.
    pub async fn place_order(&self, customer_id: CustomerId) -> Result<Order, CartApiError> {
        let guard = self.db.lock_cart(customer_id).await;
        for attempt in 1..=MAX_CART_RETRIES {
            let cart =
                self.db.fetch_priced_cart(customer_id).await?.ok_or(CartApiError::CustomerNotFound(customer_id))?;
            let new_order = cart.assemble()?;
            match self.db.checkout(&cart, new_order).await {
                Ok(order) => {
                    drop(guard);
                    info!("📦️ {} placed by {customer_id} for {}", order.id, order.total_price);
                    self.call_order_created_hook(&order).await;
                    return Ok(order);
                },
                Err(StoreError::VersionConflict) => {
                    debug!("📦️ Cart for {customer_id} changed during checkout (attempt {attempt}). Retrying");
                    if attempt < MAX_CART_RETRIES {
                        backoff(attempt).await;
                    }
                },
                Err(e) => return Err(e.into()),
            }
        }
        warn!("📦️ Checkout for {customer_id} gave up after {MAX_CART_RETRIES} attempts");
        Err(CartApiError::Conflict(MAX_CART_RETRIES))
    }

    async fn call_order_created_hook(&self, order: &Order) {
        for emitter in &self.producers.order_created_producer {
            debug!("📦️ Notifying order created hook subscribers");
            emitter.publish_event(OrderCreatedEvent::new(order.clone())).await;
        }
    }

    /// The customer's most recent order.
    pub async fn view_order(&self, customer_id: CustomerId) -> Result<Order, CartApiError> {
        self.db.fetch_latest_order(customer_id).await?.ok_or(CartApiError::OrderNotFound(customer_id))
    }

    pub async fn order_history(&self, customer_id: CustomerId) -> Result<Vec<Order>, CartApiError> {
        let orders = self.db.fetch_orders_for_customer(customer_id).await?;
        trace!("📦️ {customer_id} has {} orders", orders.len());
        Ok(orders)
    }

    pub async fn orders_for_merchant(&self, merchant_id: MerchantId) -> Result<Vec<Order>, CartApiError> {
        let orders = self.db.fetch_orders_for_merchant(merchant_id).await?;
        trace!("📦️ {} orders contain products sold by {merchant_id}", orders.len());
        Ok(orders)
    }
}
