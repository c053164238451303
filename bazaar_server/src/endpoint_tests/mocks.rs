use bazaar_engine::{
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
    traits::{AccountManagement, CartManagement, CatalogManagement, OrderManagement, StoreError},
};
use mockall::mock;

mock! {
    pub Store {}
    impl CatalogManagement for Store {
        async fn fetch_product(&self, product_id: ProductId) -> Result<Option<Product>, StoreError>;
        async fn fetch_products(&self, query: &ProductQuery) -> Result<Vec<Product>, StoreError>;
        async fn fetch_products_for_merchant(&self, merchant_id: MerchantId) -> Result<Vec<Product>, StoreError>;
        async fn insert_product(&self, product: NewProduct) -> Result<Product, StoreError>;
        async fn update_product(&self, product_id: ProductId, merchant_id: MerchantId, update: ProductUpdate) -> Result<Option<Product>, StoreError>;
        async fn delete_product(&self, product_id: ProductId, merchant_id: MerchantId) -> Result<bool, StoreError>;
    }
    impl CartManagement for Store {
        async fn fetch_cart(&self, customer_id: CustomerId) -> Result<Option<Cart>, StoreError>;
        async fn save_cart(&self, customer_id: CustomerId, cart: &Cart) -> Result<Cart, StoreError>;
        async fn fetch_priced_cart(&self, customer_id: CustomerId) -> Result<Option<PricedCart>, StoreError>;
        async fn checkout(&self, cart: &PricedCart, order: NewOrder) -> Result<Order, StoreError>;
    }
    impl OrderManagement for Store {
        async fn fetch_latest_order(&self, customer_id: CustomerId) -> Result<Option<Order>, StoreError>;
        async fn fetch_orders_for_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>, StoreError>;
        async fn fetch_orders_for_merchant(&self, merchant_id: MerchantId) -> Result<Vec<Order>, StoreError>;
    }
    impl AccountManagement for Store {
        async fn insert_customer(&self, customer: NewCustomer) -> Result<Customer, StoreError>;
        async fn fetch_customer(&self, customer_id: CustomerId) -> Result<Option<Customer>, StoreError>;
        async fn fetch_customer_by_email(&self, email: &str) -> Result<Option<Customer>, StoreError>;
        async fn fetch_customers(&self) -> Result<Vec<Customer>, StoreError>;
        async fn delete_customer(&self, customer_id: CustomerId) -> Result<bool, StoreError>;
        async fn insert_merchant(&self, merchant: NewMerchant) -> Result<Merchant, StoreError>;
        async fn fetch_merchant(&self, merchant_id: MerchantId) -> Result<Option<Merchant>, StoreError>;
        async fn fetch_merchant_by_email(&self, email: &str) -> Result<Option<Merchant>, StoreError>;
        async fn fetch_merchants(&self) -> Result<Vec<Merchant>, StoreError>;
        async fn delete_merchant(&self, merchant_id: MerchantId) -> Result<bool, StoreError>;
        async fn upsert_admin(&self, admin: NewAdmin) -> Result<Admin, StoreError>;
        async fn fetch_admin_by_email(&self, email: &str) -> Result<Option<Admin>, StoreError>;
    }
}
