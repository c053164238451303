//! `SqliteDatabase` is the SQLite implementation of the Bazaar storage backend.
//!
//! It implements every trait in [`crate::traits`]. Every write runs inside a transaction that is committed before the
//! method returns.
use std::{fmt::Debug, time::Duration};

use chrono::Utc;
use log::*;
use sqlx::SqlitePool;

use super::{accounts, carts, db_url, new_pool, orders, products, DEFAULT_DB_TIMEOUT};
use crate::{
    cart::Cart,
    catalog::ProductQuery,
    checkout::PricedCart,
    db_types::{
        Admin,
        Customer,
        CustomerId,
        Merchant,
        MerchantId,
        NewAdmin,
        NewCustomer,
        NewMerchant,
        NewOrder,
        NewProduct,
        Order,
        Product,
        ProductId,
        ProductUpdate,
    },
    traits::{AccountManagement, CartGuard, CartLocks, CartManagement, CatalogManagement, OrderManagement, StoreError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
    cart_locks: CartLocks,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl CatalogManagement for SqliteDatabase {
    async fn fetch_product(&self, product_id: ProductId) -> Result<Option<Product>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::fetch_product(product_id, &mut conn).await?;
        Ok(product)
    }

    async fn fetch_products(&self, query: &ProductQuery) -> Result<Vec<Product>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let result = products::fetch_products(query, &mut conn).await?;
        Ok(result)
    }

    async fn fetch_products_for_merchant(&self, merchant_id: MerchantId) -> Result<Vec<Product>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let result = products::fetch_products_for_merchant(merchant_id, &mut conn).await?;
        Ok(result)
    }

    async fn insert_product(&self, product: NewProduct) -> Result<Product, StoreError> {
        let mut tx = self.pool.begin().await?;
        if accounts::fetch_merchant(product.merchant_id, &mut tx).await?.is_none() {
            return Err(StoreError::MissingReference(product.merchant_id.to_string()));
        }
        let product = products::insert_product(product, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ {} '{}' added by {}", product.id, product.name, product.merchant_id);
        Ok(product)
    }

    async fn update_product(
        &self,
        product_id: ProductId,
        merchant_id: MerchantId,
        update: ProductUpdate,
    ) -> Result<Option<Product>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let product = products::update_product(product_id, merchant_id, update, &mut tx).await?;
        tx.commit().await?;
        Ok(product)
    }

    async fn delete_product(&self, product_id: ProductId, merchant_id: MerchantId) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;
        let deleted = products::delete_product(product_id, merchant_id, &mut tx).await?;
        tx.commit().await?;
        Ok(deleted)
    }
}

impl CartManagement for SqliteDatabase {
    async fn fetch_cart(&self, customer_id: CustomerId) -> Result<Option<Cart>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let cart = carts::fetch_cart(customer_id, &mut tx).await?;
        tx.commit().await?;
        Ok(cart)
    }

    async fn save_cart(&self, customer_id: CustomerId, cart: &Cart) -> Result<Cart, StoreError> {
        let mut tx = self.pool.begin().await?;
        if !carts::claim_version(customer_id, cart.version, cart.updated_at, &mut tx).await? {
            debug!("🗃️ Cart version {} for {customer_id} is stale", cart.version);
            return Err(StoreError::VersionConflict);
        }
        carts::replace_items(customer_id, &cart.items, &mut tx).await?;
        tx.commit().await?;
        Ok(Cart::new(cart.items.clone(), cart.updated_at, cart.version + 1))
    }

    async fn fetch_priced_cart(&self, customer_id: CustomerId) -> Result<Option<PricedCart>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let cart = carts::fetch_priced_cart(customer_id, &mut tx).await?;
        tx.commit().await?;
        Ok(cart)
    }

    async fn checkout(&self, cart: &PricedCart, order: NewOrder) -> Result<Order, StoreError> {
        let mut tx = self.pool.begin().await?;
        if !carts::claim_version(cart.customer_id, cart.version, Utc::now(), &mut tx).await? {
            debug!("🗃️ Cart for {} changed during checkout", cart.customer_id);
            return Err(StoreError::VersionConflict);
        }
        let current = carts::fetch_priced_cart(cart.customer_id, &mut tx).await?;
        if current.as_ref().map(|c| &c.lines) != Some(&cart.lines) {
            debug!("🗃️ Prices or items for {} changed during checkout", cart.customer_id);
            return Err(StoreError::VersionConflict);
        }
        let order = orders::insert_order(order, &mut tx).await?;
        carts::replace_items(cart.customer_id, &[], &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ {} committed and the cart for {} cleared", order.id, order.customer_id);
        Ok(order)
    }

    async fn lock_cart(&self, customer_id: CustomerId) -> CartGuard {
        self.cart_locks.lock(customer_id).await
    }
}

impl OrderManagement for SqliteDatabase {
    async fn fetch_latest_order(&self, customer_id: CustomerId) -> Result<Option<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_latest_order(customer_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_orders_for_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let result = orders::fetch_orders_for_customer(customer_id, &mut conn).await?;
        Ok(result)
    }

    async fn fetch_orders_for_merchant(&self, merchant_id: MerchantId) -> Result<Vec<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let result = orders::fetch_orders_for_merchant(merchant_id, &mut conn).await?;
        Ok(result)
    }
}

impl AccountManagement for SqliteDatabase {
    async fn insert_customer(&self, customer: NewCustomer) -> Result<Customer, StoreError> {
        let mut tx = self.pool.begin().await?;
        let customer = accounts::insert_customer(customer, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ {} registered", customer.id);
        Ok(customer)
    }

    async fn fetch_customer(&self, customer_id: CustomerId) -> Result<Option<Customer>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let customer = accounts::fetch_customer(customer_id, &mut conn).await?;
        Ok(customer)
    }

    async fn fetch_customer_by_email(&self, email: &str) -> Result<Option<Customer>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let customer = accounts::fetch_customer_by_email(email, &mut conn).await?;
        Ok(customer)
    }

    async fn fetch_customers(&self) -> Result<Vec<Customer>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let customers = accounts::fetch_customers(&mut conn).await?;
        Ok(customers)
    }

    async fn delete_customer(&self, customer_id: CustomerId) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;
        let deleted = accounts::delete_customer(customer_id, &mut tx).await?;
        tx.commit().await?;
        Ok(deleted)
    }

    async fn insert_merchant(&self, merchant: NewMerchant) -> Result<Merchant, StoreError> {
        let mut tx = self.pool.begin().await?;
        let merchant = accounts::insert_merchant(merchant, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ {} registered", merchant.id);
        Ok(merchant)
    }

    async fn fetch_merchant(&self, merchant_id: MerchantId) -> Result<Option<Merchant>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let merchant = accounts::fetch_merchant(merchant_id, &mut conn).await?;
        Ok(merchant)
    }

    async fn fetch_merchant_by_email(&self, email: &str) -> Result<Option<Merchant>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let merchant = accounts::fetch_merchant_by_email(email, &mut conn).await?;
        Ok(merchant)
    }

    async fn fetch_merchants(&self) -> Result<Vec<Merchant>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let merchants = accounts::fetch_merchants(&mut conn).await?;
        Ok(merchants)
    }

    async fn delete_merchant(&self, merchant_id: MerchantId) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;
        let removed = products::delete_products_for_merchant(merchant_id, &mut tx).await?;
        let deleted = accounts::delete_merchant(merchant_id, &mut tx).await?;
        tx.commit().await?;
        if deleted {
            debug!("🗃️ {merchant_id} deleted along with {removed} products");
        }
        Ok(deleted)
    }

    async fn upsert_admin(&self, admin: NewAdmin) -> Result<Admin, StoreError> {
        let mut tx = self.pool.begin().await?;
        let admin = accounts::upsert_admin(admin, &mut tx).await?;
        tx.commit().await?;
        Ok(admin)
    }

    async fn fetch_admin_by_email(&self, email: &str) -> Result<Option<Admin>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let admin = accounts::fetch_admin_by_email(email, &mut conn).await?;
        Ok(admin)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using `BZR_DATABASE_URL`.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        SqliteDatabase::new_with_options(url, max_connections, DEFAULT_DB_TIMEOUT).await
    }

    pub async fn new_with_options(url: &str, max_connections: u32, timeout: Duration) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections, timeout).await?;
        let url = url.to_string();
        Ok(Self { url, pool, cart_locks: CartLocks::new() })
    }

    /// Brings the schema up to date.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./src/db/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Closes every connection in the pool. Clones of this handle share the pool and are closed too.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("🗃️ Database connections closed");
    }
}
