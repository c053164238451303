use std::fmt::Debug;

use log::*;

use crate::{
    bzr_api::errors::AccountApiError,
    db_types::{Customer, CustomerId, Merchant, MerchantId},
    search::match_by_name,
    traits::AccountManagement,
};

/// `AccountApi` provides the admin directory: name search over customers and merchants, and account removal.
pub struct AccountApi<B> {
    db: B,
}

impl<B> Debug for AccountApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccountApi")
    }
}

impl<B> AccountApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> AccountApi<B>
where B: AccountManagement
{
    pub async fn customer(&self, customer_id: CustomerId) -> Result<Customer, AccountApiError> {
        self.db.fetch_customer(customer_id).await?.ok_or(AccountApiError::CustomerNotFound(customer_id))
    }

    /// Customers whose name contains every word of `query`, ignoring case. An empty query returns everyone.
    pub async fn search_customers(&self, query: &str) -> Result<Vec<Customer>, AccountApiError> {
        let all = self.db.fetch_customers().await?;
        let result = match_by_name(query, all).collect::<Vec<_>>();
        debug!("🔐️ Customer search '{query}' matched {} accounts", result.len());
        Ok(result)
    }

    /// Merchants whose owner name contains every word of `query`, ignoring case.
    pub async fn search_merchants(&self, query: &str) -> Result<Vec<Merchant>, AccountApiError> {
        let all = self.db.fetch_merchants().await?;
        let result = match_by_name(query, all).collect::<Vec<_>>();
        debug!("🔐️ Merchant search '{query}' matched {} accounts", result.len());
        Ok(result)
    }

    pub async fn delete_customer(&self, customer_id: CustomerId) -> Result<(), AccountApiError> {
        if !self.db.delete_customer(customer_id).await? {
            return Err(AccountApiError::CustomerNotFound(customer_id));
        }
        info!("🔐️ {customer_id} deleted");
        Ok(())
    }

    /// Deletes the merchant along with all of its products.
    pub async fn delete_merchant(&self, merchant_id: MerchantId) -> Result<(), AccountApiError> {
        if !self.db.delete_merchant(merchant_id).await? {
            return Err(AccountApiError::MerchantNotFound(merchant_id));
        }
        info!("🔐️ {merchant_id} deleted");
        Ok(())
    }
}
