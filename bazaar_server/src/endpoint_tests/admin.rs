use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use bazaar_engine::{
    db_types::{CustomerId, Merchant, MerchantId, Role},
    AccountApi,
};
use chrono::Utc;

use super::{
    helpers::{customer, issue_token, send},
    mocks::MockStore,
};
use crate::routes::{CustomersRoute, DeleteCustomerRoute, DeleteMerchantRoute, MerchantsRoute};

fn configure(store: MockStore) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.service(CustomersRoute::<MockStore>::new())
            .service(MerchantsRoute::<MockStore>::new())
            .service(DeleteCustomerRoute::<MockStore>::new())
            .service(DeleteMerchantRoute::<MockStore>::new())
            .app_data(web::Data::new(AccountApi::new(store)));
    }
}

fn store_with_customers() -> MockStore {
    let mut store = MockStore::new();
    store.expect_fetch_customers().returning(|| {
        Ok(vec![customer(1, "Ann Lee"), customer(2, "Bob Lee"), customer(3, "Annabel Smith")])
    });
    store
}

fn merchant(id: i64, owner_name: &str) -> Merchant {
    Merchant {
        id: MerchantId(id),
        owner_name: owner_name.into(),
        email: format!("shop{id}@example.com"),
        password_hash: "$argon2id$hidden".into(),
        created_at: Utc::now(),
    }
}

#[actix_web::test]
async fn search_customers_by_name() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(1, Role::Admin);
    let (status, body) =
        send(TestRequest::get().uri("/admin/customers?name=ann"), Some(&token), configure(store_with_customers())).await;
    assert_eq!(status, StatusCode::OK);
    let ids = body["data"].as_array().unwrap().iter().map(|c| c["id"].as_i64().unwrap()).collect::<Vec<_>>();
    assert_eq!(ids, vec![1, 3]);
    assert!(body["data"][0].get("password_hash").is_none());

    let (status, body) =
        send(TestRequest::get().uri("/admin/customers?name=LEE%20ann"), Some(&token), configure(store_with_customers()))
            .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["name"], "Ann Lee");
}

#[actix_web::test]
async fn an_empty_search_lists_everyone() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(1, Role::Admin);
    let (status, body) =
        send(TestRequest::get().uri("/admin/customers"), Some(&token), configure(store_with_customers())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
}

#[actix_web::test]
async fn searches_without_matches() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(1, Role::Admin);
    let (status, body) =
        send(TestRequest::get().uri("/admin/customers?name=zed"), Some(&token), configure(store_with_customers()))
            .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "The data was not found. No customers found");
}

#[actix_web::test]
async fn search_merchants_by_owner_name() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(1, Role::Admin);
    let mut store = MockStore::new();
    store.expect_fetch_merchants().returning(|| Ok(vec![merchant(4, "Cara Diaz"), merchant(5, "Dev Patel")]));
    let (status, body) = send(TestRequest::get().uri("/admin/merchants?name=diaz"), Some(&token), configure(store)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["owner_name"], "Cara Diaz");
    assert!(body["data"][0].get("password_hash").is_none());
}

#[actix_web::test]
async fn the_directory_is_for_admins_only() {
    let _ = env_logger::try_init().ok();
    for role in [Role::Customer, Role::Merchant] {
        let token = issue_token(1, role);
        let (status, _) =
            send(TestRequest::get().uri("/admin/customers"), Some(&token), configure(MockStore::new())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
    let (status, _) = send(TestRequest::get().uri("/admin/merchants"), None, configure(MockStore::new())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn delete_customer() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(1, Role::Admin);
    let mut store = MockStore::new();
    store.expect_delete_customer().withf(|cid| *cid == CustomerId(2)).times(1).returning(|_| Ok(true));
    let (status, body) = send(TestRequest::delete().uri("/admin/customer/2"), Some(&token), configure(store)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Customer deleted successfully");

    let mut store = MockStore::new();
    store.expect_delete_customer().returning(|_| Ok(false));
    let (status, body) = send(TestRequest::delete().uri("/admin/customer/99"), Some(&token), configure(store)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "The data was not found. customer#99 does not exist");
}

#[actix_web::test]
async fn delete_merchant() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(1, Role::Admin);
    let mut store = MockStore::new();
    store.expect_delete_merchant().withf(|mid| *mid == MerchantId(4)).times(1).returning(|_| Ok(true));
    let (status, _) = send(TestRequest::delete().uri("/admin/merchant/4"), Some(&token), configure(store)).await;
    assert_eq!(status, StatusCode::OK);

    let mut store = MockStore::new();
    store.expect_delete_merchant().returning(|_| Ok(false));
    let (status, _) = send(TestRequest::delete().uri("/admin/merchant/5"), Some(&token), configure(store)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
