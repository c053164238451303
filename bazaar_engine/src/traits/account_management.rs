use crate::{
    db_types::{Admin, Customer, CustomerId, Merchant, MerchantId, NewAdmin, NewCustomer, NewMerchant},
    traits::StoreError,
};

/// Storage for the three kinds of account.
///
/// Emails are stored exactly as given; callers normalise them first. Inserting an account with an email that is
/// already registered fails with [`StoreError::Duplicate`].
#[allow(async_fn_in_trait)]
pub trait AccountManagement {
    /// Creates the customer together with an empty cart.
    async fn insert_customer(&self, customer: NewCustomer) -> Result<Customer, StoreError>;

    async fn fetch_customer(&self, customer_id: CustomerId) -> Result<Option<Customer>, StoreError>;

    async fn fetch_customer_by_email(&self, email: &str) -> Result<Option<Customer>, StoreError>;

    /// All customers in registration order.
    async fn fetch_customers(&self) -> Result<Vec<Customer>, StoreError>;

    /// Deletes the customer and their cart. Placed orders are kept. Returns `false` if there was no such customer.
    async fn delete_customer(&self, customer_id: CustomerId) -> Result<bool, StoreError>;

    async fn insert_merchant(&self, merchant: NewMerchant) -> Result<Merchant, StoreError>;

    async fn fetch_merchant(&self, merchant_id: MerchantId) -> Result<Option<Merchant>, StoreError>;

    async fn fetch_merchant_by_email(&self, email: &str) -> Result<Option<Merchant>, StoreError>;

    /// All merchants in registration order.
    async fn fetch_merchants(&self) -> Result<Vec<Merchant>, StoreError>;

    /// Deletes the merchant and all of its products. Returns `false` if there was no such merchant.
    async fn delete_merchant(&self, merchant_id: MerchantId) -> Result<bool, StoreError>;

    /// Creates the admin, or replaces the name and password hash of the admin with the same email.
    async fn upsert_admin(&self, admin: NewAdmin) -> Result<Admin, StoreError>;

    async fn fetch_admin_by_email(&self, email: &str) -> Result<Option<Admin>, StoreError>;
}
