use thiserror::Error;

use crate::{
    cart::CartError,
    checkout::AssemblyError,
    db_types::{CustomerId, MerchantId, ProductId},
    traits::StoreError,
};

/// Errors from the cart and checkout flows.
#[derive(Debug, Clone, Error)]
pub enum CartApiError {
    #[error("Store error: {0}")]
    Store(StoreError),
    #[error("{0} does not exist")]
    CustomerNotFound(CustomerId),
    #[error("{0} does not exist")]
    ProductNotFound(ProductId),
    #[error("{0} is not in the cart")]
    ItemNotFound(ProductId),
    #[error("Invalid cart request: {0}")]
    ValidationError(String),
    #[error("The cart is empty")]
    EmptyCart,
    #[error("{0} is no longer available")]
    ProductUnavailable(ProductId),
    #[error("{0} has not placed any orders")]
    OrderNotFound(CustomerId),
    #[error("The cart kept changing while it was being updated. Giving up after {0} attempts")]
    Conflict(usize),
}

impl From<StoreError> for CartApiError {
    fn from(e: StoreError) -> Self {
        CartApiError::Store(e)
    }
}

impl From<CartError> for CartApiError {
    fn from(e: CartError) -> Self {
        match e {
            CartError::ItemNotFound(p) => CartApiError::ItemNotFound(p),
            e @ (CartError::InvalidQuantity(_) | CartError::QuantityOverflow(_)) => {
                CartApiError::ValidationError(e.to_string())
            },
        }
    }
}

impl From<AssemblyError> for CartApiError {
    fn from(e: AssemblyError) -> Self {
        match e {
            AssemblyError::EmptyCart => CartApiError::EmptyCart,
            AssemblyError::ProductUnavailable(p) => CartApiError::ProductUnavailable(p),
            AssemblyError::TotalOverflow => CartApiError::ValidationError(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum CatalogApiError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Invalid product: {0}")]
    ValidationError(String),
    #[error("{0} does not exist")]
    ProductNotFound(ProductId),
    #[error("{0} does not exist")]
    MerchantNotFound(MerchantId),
}

#[derive(Debug, Clone, Error)]
pub enum AuthApiError {
    #[error("Store error: {0}")]
    Store(StoreError),
    #[error("Invalid registration: {0}")]
    ValidationError(String),
    #[error("The email address {0} is already registered")]
    EmailInUse(String),
}

impl From<StoreError> for AuthApiError {
    fn from(e: StoreError) -> Self {
        AuthApiError::Store(e)
    }
}

#[derive(Debug, Clone, Error)]
pub enum AccountApiError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("{0} does not exist")]
    CustomerNotFound(CustomerId),
    #[error("{0} does not exist")]
    MerchantNotFound(MerchantId),
}
