use crate::{
    catalog::ProductQuery,
    db_types::{MerchantId, NewProduct, Product, ProductId, ProductUpdate},
    traits::StoreError,
};

/// Product catalog storage.
#[allow(async_fn_in_trait)]
pub trait CatalogManagement {
    async fn fetch_product(&self, product_id: ProductId) -> Result<Option<Product>, StoreError>;

    /// Returns the products matching `query.filter`, in the order requested by `query.sort`.
    ///
    /// Sort fields the backend cannot order by are ignored, in which case products are returned in insertion order.
    async fn fetch_products(&self, query: &ProductQuery) -> Result<Vec<Product>, StoreError>;

    async fn fetch_products_for_merchant(&self, merchant_id: MerchantId) -> Result<Vec<Product>, StoreError>;

    async fn insert_product(&self, product: NewProduct) -> Result<Product, StoreError>;

    /// Applies the non-empty fields of `update` to the product, provided it belongs to `merchant_id`.
    /// Returns `None` if there is no such product owned by the merchant.
    async fn update_product(
        &self,
        product_id: ProductId,
        merchant_id: MerchantId,
        update: ProductUpdate,
    ) -> Result<Option<Product>, StoreError>;

    /// Deletes the product if it belongs to `merchant_id`. Returns `false` if nothing was deleted.
    async fn delete_product(&self, product_id: ProductId, merchant_id: MerchantId) -> Result<bool, StoreError>;
}
