use std::fmt::Debug;

use log::*;

use crate::{
    bzr_api::errors::CatalogApiError,
    catalog::ProductQuery,
    db_types::{MerchantId, NewProduct, Product, ProductId, ProductUpdate},
    traits::{CatalogManagement, StoreError},
};

/// `CatalogApi` serves catalog browsing for customers and product management for merchants.
///
/// Merchants can only change their own products. Attempts to touch another merchant's product are reported as
/// [`CatalogApiError::ProductNotFound`].
pub struct CatalogApi<B> {
    db: B,
}

impl<B> Debug for CatalogApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CatalogApi")
    }
}

impl<B> CatalogApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

fn validate_name(name: &str) -> Result<(), CatalogApiError> {
    if name.trim().is_empty() {
        return Err(CatalogApiError::ValidationError("Product name cannot be empty".into()));
    }
    Ok(())
}

fn validate_qty(qty: i64) -> Result<(), CatalogApiError> {
    if qty < 0 {
        return Err(CatalogApiError::ValidationError(format!("Quantity cannot be negative ({qty})")));
    }
    Ok(())
}

impl<B> CatalogApi<B>
where B: CatalogManagement
{
    pub async fn browse(&self, query: &ProductQuery) -> Result<Vec<Product>, CatalogApiError> {
        let products = self.db.fetch_products(query).await?;
        trace!("🗃️ Browse query {query:?} matched {} products", products.len());
        Ok(products)
    }

    pub async fn products_for_merchant(&self, merchant_id: MerchantId) -> Result<Vec<Product>, CatalogApiError> {
        let products = self.db.fetch_products_for_merchant(merchant_id).await?;
        Ok(products)
    }

    /// Lists a new product. Fails with [`CatalogApiError::MerchantNotFound`] if the merchant has been deleted.
    pub async fn add_product(&self, product: NewProduct) -> Result<Product, CatalogApiError> {
        validate_name(&product.name)?;
        validate_qty(product.qty)?;
        if product.price.is_negative() {
            return Err(CatalogApiError::ValidationError("Price cannot be negative".into()));
        }
        let merchant_id = product.merchant_id;
        let product = self.db.insert_product(product).await.map_err(|e| match e {
            StoreError::MissingReference(_) => CatalogApiError::MerchantNotFound(merchant_id),
            e => CatalogApiError::Store(e),
        })?;
        info!("🗃️ {} added {} '{}' at {}", product.merchant_id, product.id, product.name, product.price);
        Ok(product)
    }

    /// Applies a partial update. At least one field must be present.
    pub async fn edit_product(
        &self,
        merchant_id: MerchantId,
        product_id: ProductId,
        update: ProductUpdate,
    ) -> Result<Product, CatalogApiError> {
        if update.is_empty() {
            return Err(CatalogApiError::ValidationError("Nothing to update".into()));
        }
        if let Some(name) = &update.name {
            validate_name(name)?;
        }
        if let Some(qty) = update.qty {
            validate_qty(qty)?;
        }
        if update.price.is_some_and(|p| p.is_negative()) {
            return Err(CatalogApiError::ValidationError("Price cannot be negative".into()));
        }
        let product = self
            .db
            .update_product(product_id, merchant_id, update)
            .await?
            .ok_or(CatalogApiError::ProductNotFound(product_id))?;
        debug!("🗃️ {merchant_id} edited {product_id}");
        Ok(product)
    }

    pub async fn delete_product(&self, merchant_id: MerchantId, product_id: ProductId) -> Result<(), CatalogApiError> {
        if !self.db.delete_product(product_id, merchant_id).await? {
            return Err(CatalogApiError::ProductNotFound(product_id));
        }
        info!("🗃️ {merchant_id} deleted {product_id}");
        Ok(())
    }
}
