use std::fmt::Display;

use bazaar_common::Money;
use bazaar_engine::{
    cart::QtyAction,
    catalog::ProductQuery,
    db_types::{MerchantId, NewProduct, ProductId, ProductUpdate},
};
use serde::{Deserialize, Serialize};

use crate::errors::ServerError;

/// The envelope for every response body: `{ success, message, data }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse<T = ()> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string(), data: None }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string(), data: None }
    }
}

impl<T: Serialize> JsonResponse<T> {
    pub fn with_data<S: Display>(message: S, data: T) -> Self {
        Self { success: true, message: message.to_string(), data: Some(data) }
    }
}

//----------------------------------------------   Accounts  ----------------------------------------------------
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user_id: i64,
    pub name: String,
}

/// Missing fields deserialize as empty strings so that the "is required" checks can name them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerSignup {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub address: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MerchantSignup {
    pub owner_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NameSearch {
    #[serde(default)]
    pub name: String,
}

//----------------------------------------------   Cart  --------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    pub qty: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustQtyRequest {
    pub action: QtyAction,
}

//----------------------------------------------   Products  ----------------------------------------------------
/// A price as supplied by a client. Integers are minor units (the same representation prices are returned in).
/// Strings are decimal amounts in major units, e.g. `"12.50"`. Fractional JSON numbers are rejected rather than
/// rounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    Cents(i64),
    Decimal(String),
}

impl TryFrom<PriceInput> for Money {
    type Error = ServerError;

    fn try_from(value: PriceInput) -> Result<Self, Self::Error> {
        match value {
            PriceInput::Cents(c) => Ok(Money::from_cents(c)),
            PriceInput::Decimal(s) => s.parse::<Money>().map_err(|e| ServerError::ValidationError(e.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProductRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    pub price: PriceInput,
    pub qty: i64,
}

impl NewProductRequest {
    pub fn into_new_product(self, merchant_id: MerchantId) -> Result<NewProduct, ServerError> {
        let price = Money::try_from(self.price)?;
        let mut product = NewProduct::new(self.name.trim(), price, self.qty, merchant_id);
        product.category = self.category.map(|c| c.trim().to_string()).filter(|c| !c.is_empty());
        Ok(product)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<PriceInput>,
    pub qty: Option<i64>,
}

impl TryFrom<UpdateProductRequest> for ProductUpdate {
    type Error = ServerError;

    fn try_from(value: UpdateProductRequest) -> Result<Self, Self::Error> {
        let price = value.price.map(Money::try_from).transpose()?;
        Ok(ProductUpdate { name: value.name, category: value.category, price, qty: value.qty })
    }
}

/// Query parameters for browsing the catalog, e.g. `?category=home&minPrice=500&maxPrice=2000&sort=-price`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowseParams {
    pub category: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub sort: Option<String>,
}

impl BrowseParams {
    pub fn into_query(self) -> Result<ProductQuery, ServerError> {
        let min_price = self.min_price.as_deref().map(parse_bound).transpose()?;
        let max_price = self.max_price.as_deref().map(parse_bound).transpose()?;
        Ok(ProductQuery::build(self.category, min_price, max_price, self.sort.as_deref()))
    }
}

/// Query-string bounds follow the same rules as [`PriceInput`]: plain integers are minor units, decimals are major
/// units.
fn parse_bound(s: &str) -> Result<Money, ServerError> {
    let s = s.trim();
    match s.parse::<i64>() {
        Ok(cents) => Ok(Money::from_cents(cents)),
        Err(_) => s.parse::<Money>().map_err(|e| ServerError::ValidationError(e.to_string())),
    }
}
