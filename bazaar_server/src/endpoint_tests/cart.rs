use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use bazaar_engine::{
    cart::{Cart, CartItem, QtyAction},
    db_types::{CustomerId, ProductId, Role},
    traits::StoreError,
    CartApi,
    MAX_CART_RETRIES,
};
use chrono::Utc;
use serde_json::json;

use super::{
    helpers::{issue_token, product, send},
    mocks::MockStore,
};
use crate::routes::{AddToCartRoute, AdjustCartItemRoute, RemoveCartItemRoute, ViewCartRoute};

fn configure(store: MockStore) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.service(ViewCartRoute::<MockStore>::new())
            .service(AddToCartRoute::<MockStore>::new())
            .service(AdjustCartItemRoute::<MockStore>::new())
            .service(RemoveCartItemRoute::<MockStore>::new())
            .app_data(web::Data::new(CartApi::new(store)));
    }
}

fn cart(items: &[(i64, i64)], version: i64) -> Cart {
    let items = items.iter().map(|(p, q)| CartItem::new(ProductId(*p), *q)).collect();
    Cart::new(items, Utc::now(), version)
}

/// A store holding one cart for customer #7 that accepts any save.
fn store_with_cart(items: &'static [(i64, i64)]) -> MockStore {
    let mut store = MockStore::new();
    store.expect_fetch_cart().withf(|cid| *cid == CustomerId(7)).returning(move |_| Ok(Some(cart(items, 1))));
    store.expect_save_cart().returning(|_, c| Ok(Cart::new(c.items.clone(), c.updated_at, c.version + 1)));
    store
}

#[actix_web::test]
async fn view_cart() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(7, Role::Customer);
    let store = store_with_cart(&[(1, 2), (2, 1)]);
    let (status, body) = send(TestRequest::get().uri("/customer/cart"), Some(&token), configure(store)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"], json!([{"product_id": 1, "qty": 2}, {"product_id": 2, "qty": 1}]));
    assert!(body["data"].get("version").is_none());
}

#[actix_web::test]
async fn view_cart_for_a_deleted_customer() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(9, Role::Customer);
    let mut store = MockStore::new();
    store.expect_fetch_cart().returning(|_| Ok(None));
    let (status, body) = send(TestRequest::get().uri("/customer/cart"), Some(&token), configure(store)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "The data was not found. customer#9 does not exist");
}

#[actix_web::test]
async fn add_merges_into_the_existing_line() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(7, Role::Customer);
    let mut store = store_with_cart(&[(1, 2)]);
    store.expect_fetch_product().withf(|pid| *pid == ProductId(1)).returning(|_| Ok(Some(product(1, 4, "Lamp", 1000))));
    let req = TestRequest::post().uri("/customer/cart").set_json(json!({"productId": 1, "qty": 3}));
    let (status, body) = send(req, Some(&token), configure(store)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"], json!([{"product_id": 1, "qty": 5}]));
}

#[actix_web::test]
async fn add_validates_the_request() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(7, Role::Customer);
    let req = TestRequest::post().uri("/customer/cart").set_json(json!({"productId": 1, "qty": 0}));
    let (status, _) = send(req, Some(&token), configure(MockStore::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let req = TestRequest::post().uri("/customer/cart").set_json(json!({"productId": "lamp", "qty": 1}));
    let (status, body) = send(req, Some(&token), configure(MockStore::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let mut store = MockStore::new();
    store.expect_fetch_product().returning(|_| Ok(None));
    let req = TestRequest::post().uri("/customer/cart").set_json(json!({"productId": 99, "qty": 1}));
    let (status, _) = send(req, Some(&token), configure(store)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn decrementing_the_last_unit_removes_the_line() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(7, Role::Customer);
    let store = store_with_cart(&[(1, 1), (2, 3)]);
    let req = TestRequest::patch().uri("/customer/cart/1").set_json(json!({"action": "dec"}));
    let (status, body) = send(req, Some(&token), configure(store)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"], json!([{"product_id": 2, "qty": 3}]));
}

#[actix_web::test]
async fn adjusting_a_missing_line_is_not_found() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(7, Role::Customer);
    let mut store = MockStore::new();
    store.expect_fetch_cart().returning(|_| Ok(Some(cart(&[(2, 3)], 1))));
    store.expect_save_cart().never();
    let req = TestRequest::patch().uri("/customer/cart/1").set_json(json!({"action": QtyAction::Increment}));
    let (status, _) = send(req, Some(&token), configure(store)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn adjust_rejects_unknown_actions_and_paths() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(7, Role::Customer);
    let req = TestRequest::patch().uri("/customer/cart/1").set_json(json!({"action": "double"}));
    let (status, _) = send(req, Some(&token), configure(MockStore::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let req = TestRequest::patch().uri("/customer/cart/lamp").set_json(json!({"action": "inc"}));
    let (status, body) = send(req, Some(&token), configure(MockStore::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[actix_web::test]
async fn removing_an_absent_item_succeeds() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(7, Role::Customer);
    let store = store_with_cart(&[(2, 3)]);
    let (status, body) = send(TestRequest::delete().uri("/customer/cart/1"), Some(&token), configure(store)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"], json!([{"product_id": 2, "qty": 3}]));
}

#[actix_web::test]
async fn persistent_conflicts_give_409() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(7, Role::Customer);
    let mut store = MockStore::new();
    store.expect_fetch_cart().times(MAX_CART_RETRIES).returning(|_| Ok(Some(cart(&[(1, 1)], 1))));
    store.expect_save_cart().times(MAX_CART_RETRIES).returning(|_, _| Err(StoreError::VersionConflict));
    let req = TestRequest::patch().uri("/customer/cart/1").set_json(json!({"action": "inc"}));
    let (status, body) = send(req, Some(&token), configure(store)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
}

#[actix_web::test]
async fn busy_database_gives_503() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(7, Role::Customer);
    let mut store = MockStore::new();
    store.expect_fetch_cart().returning(|_| Err(StoreError::Transient("pool timed out".into())));
    let (status, body) = send(TestRequest::get().uri("/customer/cart"), Some(&token), configure(store)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["message"], "The service is temporarily unavailable. Please try again.");
}
