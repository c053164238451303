#![allow(dead_code)]
use bazaar_common::Money;
use bazaar_engine::{
    db_types::{Customer, Merchant, MerchantId, NewCustomer, NewMerchant, NewProduct, Product},
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    traits::{AccountManagement, CatalogManagement},
    SqliteDatabase,
};

pub async fn setup() -> SqliteDatabase {
    prepare_test_env(&random_db_path()).await
}

pub async fn new_customer(db: &SqliteDatabase, name: &str) -> Customer {
    let customer = NewCustomer {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        password_hash: "not-a-real-hash".to_string(),
        phone: "555-0100".to_string(),
        address: format!("{name}'s house"),
    };
    db.insert_customer(customer).await.expect("Error creating customer")
}

pub async fn new_merchant(db: &SqliteDatabase, name: &str) -> Merchant {
    let merchant = NewMerchant {
        owner_name: name.to_string(),
        email: format!("{}@shop.example.com", name.to_lowercase().replace(' ', ".")),
        password_hash: "not-a-real-hash".to_string(),
    };
    db.insert_merchant(merchant).await.expect("Error creating merchant")
}

pub async fn new_product(db: &SqliteDatabase, merchant_id: MerchantId, name: &str, price: &str) -> Product {
    let price = price.parse::<Money>().expect("Invalid price");
    db.insert_product(NewProduct::new(name, price, 10, merchant_id)).await.expect("Error creating product")
}

pub async fn new_product_in(
    db: &SqliteDatabase,
    merchant_id: MerchantId,
    name: &str,
    category: &str,
    price: &str,
) -> Product {
    let price = price.parse::<Money>().expect("Invalid price");
    let product = NewProduct::new(name, price, 10, merchant_id).with_category(category);
    db.insert_product(product).await.expect("Error creating product")
}
