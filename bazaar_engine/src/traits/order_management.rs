use crate::{
    db_types::{CustomerId, MerchantId, Order},
    traits::StoreError,
};

#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// The customer's most recent order, by creation time and then id.
    async fn fetch_latest_order(&self, customer_id: CustomerId) -> Result<Option<Order>, StoreError>;

    /// All of the customer's orders, oldest first.
    async fn fetch_orders_for_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>, StoreError>;

    /// All orders containing at least one product sold by the merchant, oldest first.
    async fn fetch_orders_for_merchant(&self, merchant_id: MerchantId) -> Result<Vec<Order>, StoreError>;
}
