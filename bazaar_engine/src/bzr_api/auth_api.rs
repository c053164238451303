use std::fmt::Debug;

use bazaar_common::helpers::normalize_email;
use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    bzr_api::errors::AuthApiError,
    db_types::{Admin, Customer, Merchant, NewAdmin, NewCustomer, NewMerchant, Role},
    traits::{AccountManagement, StoreError},
};

/// The stored login details of any kind of account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub id: i64,
    pub name: String,
    pub role: Role,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

impl From<Customer> for Credentials {
    fn from(c: Customer) -> Self {
        Self { id: c.id.value(), name: c.name, role: Role::Customer, password_hash: c.password_hash }
    }
}

impl From<Merchant> for Credentials {
    fn from(m: Merchant) -> Self {
        Self { id: m.id.value(), name: m.owner_name, role: Role::Merchant, password_hash: m.password_hash }
    }
}

impl From<Admin> for Credentials {
    fn from(a: Admin) -> Self {
        Self { id: a.id.value(), name: a.name, role: Role::Admin, password_hash: a.password_hash }
    }
}

/// `AuthApi` registers accounts and looks up their credentials. Password hashing and token issuance happen at the
/// server boundary; this API only ever sees password hashes.
///
/// Emails are trimmed and lower-cased before they are stored or looked up.
pub struct AuthApi<B> {
    db: B,
}

impl<B> Debug for AuthApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AuthApi")
    }
}

impl<B> AuthApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

fn require(field: &str, value: &str) -> Result<(), AuthApiError> {
    if value.trim().is_empty() {
        return Err(AuthApiError::ValidationError(format!("{field} is required")));
    }
    Ok(())
}

fn email_in_use(e: StoreError, email: &str) -> AuthApiError {
    match e {
        StoreError::Duplicate(_) => AuthApiError::EmailInUse(email.to_string()),
        e => AuthApiError::Store(e),
    }
}

impl<B> AuthApi<B>
where B: AccountManagement
{
    pub async fn register_customer(&self, mut customer: NewCustomer) -> Result<Customer, AuthApiError> {
        require("name", &customer.name)?;
        require("email", &customer.email)?;
        require("phone", &customer.phone)?;
        require("address", &customer.address)?;
        customer.email = normalize_email(&customer.email);
        if self.db.fetch_customer_by_email(&customer.email).await?.is_some() {
            return Err(AuthApiError::EmailInUse(customer.email));
        }
        let email = customer.email.clone();
        let customer = self.db.insert_customer(customer).await.map_err(|e| email_in_use(e, &email))?;
        info!("🔐️ New customer {} registered", customer.id);
        Ok(customer)
    }

    pub async fn register_merchant(&self, mut merchant: NewMerchant) -> Result<Merchant, AuthApiError> {
        require("owner name", &merchant.owner_name)?;
        require("email", &merchant.email)?;
        merchant.email = normalize_email(&merchant.email);
        if self.db.fetch_merchant_by_email(&merchant.email).await?.is_some() {
            return Err(AuthApiError::EmailInUse(merchant.email));
        }
        let email = merchant.email.clone();
        let merchant = self.db.insert_merchant(merchant).await.map_err(|e| email_in_use(e, &email))?;
        info!("🔐️ New merchant {} registered", merchant.id);
        Ok(merchant)
    }

    /// Creates the admin account, or resets its name and password if the email is already an admin.
    pub async fn upsert_admin(&self, mut admin: NewAdmin) -> Result<Admin, AuthApiError> {
        require("name", &admin.name)?;
        require("email", &admin.email)?;
        admin.email = normalize_email(&admin.email);
        let admin = self.db.upsert_admin(admin).await?;
        info!("🔐️ Admin account {} is ready", admin.email);
        Ok(admin)
    }

    /// Looks up the credentials for a login attempt. Returns `None` if no account of that role has the email.
    pub async fn credentials(&self, role: Role, email: &str) -> Result<Option<Credentials>, AuthApiError> {
        let email = normalize_email(email);
        let creds = match role {
            Role::Customer => self.db.fetch_customer_by_email(&email).await?.map(Credentials::from),
            Role::Merchant => self.db.fetch_merchant_by_email(&email).await?.map(Credentials::from),
            Role::Admin => self.db.fetch_admin_by_email(&email).await?.map(Credentials::from),
        };
        Ok(creds)
    }
}
