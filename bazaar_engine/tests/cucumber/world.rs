use std::collections::HashMap;

use bazaar_engine::{
    db_types::{Customer, Merchant, Order, Product},
    events::EventProducers,
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    CartApi,
    CartApiError,
    CatalogApi,
    OrderFlowApi,
    SqliteDatabase,
};
use cucumber::World;

#[derive(Default, Debug, World)]
pub struct BazaarWorld {
    pub system: Option<BazaarSystem>,
    pub customers: HashMap<String, Customer>,
    pub merchants: HashMap<String, Merchant>,
    pub products: HashMap<String, Product>,
    pub last_order: Option<Result<Order, CartApiError>>,
}

#[derive(Debug)]
pub struct BazaarSystem {
    pub db: SqliteDatabase,
    pub carts: CartApi<SqliteDatabase>,
    pub orders: OrderFlowApi<SqliteDatabase>,
    pub catalog: CatalogApi<SqliteDatabase>,
}

impl BazaarSystem {
    pub async fn new() -> Self {
        let db = prepare_test_env(&random_db_path()).await;
        let carts = CartApi::new(db.clone());
        let orders = OrderFlowApi::new(db.clone(), EventProducers::default());
        let catalog = CatalogApi::new(db.clone());
        Self { db, carts, orders, catalog }
    }
}

impl BazaarWorld {
    pub fn system(&self) -> &BazaarSystem {
        self.system.as_ref().expect("Bazaar system not initialised")
    }

    pub fn customer(&self, name: &str) -> &Customer {
        self.customers.get(name).unwrap_or_else(|| panic!("Unknown customer {name}"))
    }

    pub fn merchant(&self, name: &str) -> &Merchant {
        self.merchants.get(name).unwrap_or_else(|| panic!("Unknown merchant {name}"))
    }

    pub fn product(&self, name: &str) -> &Product {
        self.products.get(name).unwrap_or_else(|| panic!("Unknown product {name}"))
    }
}
