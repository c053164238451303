use bazaar_engine::{
    db_types::{NewCustomer, NewMerchant},
    traits::AccountManagement,
};
use cucumber::given;

use crate::cucumber::{world::BazaarSystem, BazaarWorld};

#[given("a fresh install")]
async fn fresh_database(world: &mut BazaarWorld) {
    world.system = Some(BazaarSystem::new().await);
}

#[given(expr = "a customer {word} living at {string}")]
async fn a_customer(world: &mut BazaarWorld, name: String, address: String) {
    let customer = NewCustomer {
        name: name.clone(),
        email: format!("{}@example.com", name.to_lowercase()),
        password_hash: "hash".into(),
        phone: "555-0100".into(),
        address,
    };
    let customer = world.system().db.insert_customer(customer).await.expect("Error creating customer");
    world.customers.insert(name, customer);
}

#[given(expr = "a merchant {word}")]
async fn a_merchant(world: &mut BazaarWorld, name: String) {
    let merchant = NewMerchant {
        owner_name: name.clone(),
        email: format!("{}@shop.example.com", name.to_lowercase()),
        password_hash: "hash".into(),
    };
    let merchant = world.system().db.insert_merchant(merchant).await.expect("Error creating merchant");
    world.merchants.insert(name, merchant);
}
