use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use bazaar_common::Money;
use bazaar_engine::{
    catalog::SortDirection,
    db_types::{MerchantId, Product, ProductId, Role},
    traits::StoreError,
    CatalogApi,
};
use chrono::Utc;
use serde_json::json;

use super::{
    helpers::{issue_token, product, send},
    mocks::MockStore,
};
use crate::routes::{AddProductRoute, BrowseProductsRoute, DeleteProductRoute, EditProductRoute, MyProductsRoute};

fn configure(store: MockStore) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.service(BrowseProductsRoute::<MockStore>::new())
            .service(MyProductsRoute::<MockStore>::new())
            .service(AddProductRoute::<MockStore>::new())
            .service(EditProductRoute::<MockStore>::new())
            .service(DeleteProductRoute::<MockStore>::new())
            .app_data(web::Data::new(CatalogApi::new(store)));
    }
}

#[actix_web::test]
async fn add_product() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(4, Role::Merchant);
    let mut store = MockStore::new();
    store
        .expect_insert_product()
        .withf(|p| {
            p.name == "Desk Lamp" &&
                p.price == Money::from_cents(1250) &&
                p.merchant_id == MerchantId(4) &&
                p.category.as_deref() == Some("home")
        })
        .times(1)
        .returning(|p| {
            Ok(Product {
                id: ProductId(21),
                name: p.name,
                category: p.category,
                price: p.price,
                qty: p.qty,
                merchant_id: p.merchant_id,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
        });
    let req = TestRequest::post()
        .uri("/merchant/products")
        .set_json(json!({"name": " Desk Lamp ", "category": "home", "price": "12.50", "qty": 3}));
    let (status, body) = send(req, Some(&token), configure(store)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["id"], 21);
    assert_eq!(body["data"]["price"], 1250);
    assert_eq!(body["data"]["merchant_id"], 4);
}

#[actix_web::test]
async fn deleted_merchant_cannot_add_products() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(4, Role::Merchant);
    let mut store = MockStore::new();
    store
        .expect_insert_product()
        .times(1)
        .returning(|p| Err(StoreError::MissingReference(p.merchant_id.to_string())));
    let req = TestRequest::post().uri("/merchant/products").set_json(json!({"name": "Lamp", "price": 100, "qty": 1}));
    let (status, body) = send(req, Some(&token), configure(store)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "The data was not found. merchant#4 does not exist");
}

#[actix_web::test]
async fn invalid_products_are_rejected() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(4, Role::Merchant);
    let bodies = [
        json!({"name": "", "price": 100, "qty": 1}),
        json!({"name": "Lamp", "price": -100, "qty": 1}),
        json!({"name": "Lamp", "price": 100, "qty": -1}),
        json!({"name": "Lamp", "price": "cheap", "qty": 1}),
        json!({"name": "Lamp", "price": 1.5, "qty": 1}),
        json!({"name": "Lamp", "qty": 1}),
    ];
    for body in bodies {
        let mut store = MockStore::new();
        store.expect_insert_product().never();
        let req = TestRequest::post().uri("/merchant/products").set_json(&body);
        let (status, res) = send(req, Some(&token), configure(store)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body} gave {res}");
    }
}

#[actix_web::test]
async fn edit_product() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(4, Role::Merchant);
    let mut store = MockStore::new();
    store
        .expect_update_product()
        .withf(|pid, mid, update| {
            *pid == ProductId(3) &&
                *mid == MerchantId(4) &&
                update.price == Some(Money::from_cents(900)) &&
                update.name.is_none()
        })
        .times(1)
        .returning(|_, _, _| Ok(Some(product(3, 4, "Lamp", 900))));
    let req = TestRequest::put().uri("/merchant/products/3").set_json(json!({"price": 900}));
    let (status, body) = send(req, Some(&token), configure(store)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["price"], 900);
}

#[actix_web::test]
async fn empty_edits_are_rejected() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(4, Role::Merchant);
    let mut store = MockStore::new();
    store.expect_update_product().never();
    let req = TestRequest::put().uri("/merchant/products/3").set_json(json!({}));
    let (status, body) = send(req, Some(&token), configure(store)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid product: Nothing to update");
}

#[actix_web::test]
async fn merchants_cannot_touch_other_merchants_products() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(4, Role::Merchant);
    let mut store = MockStore::new();
    store.expect_update_product().returning(|_, _, _| Ok(None));
    let req = TestRequest::put().uri("/merchant/products/8").set_json(json!({"qty": 1}));
    let (status, body) = send(req, Some(&token), configure(store)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "The data was not found. product#8 does not exist");

    let mut store = MockStore::new();
    store.expect_delete_product().withf(|pid, mid| *pid == ProductId(8) && *mid == MerchantId(4)).returning(|_, _| Ok(false));
    let (status, _) = send(TestRequest::delete().uri("/merchant/products/8"), Some(&token), configure(store)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn delete_product() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(4, Role::Merchant);
    let mut store = MockStore::new();
    store.expect_delete_product().times(1).returning(|_, _| Ok(true));
    let (status, body) = send(TestRequest::delete().uri("/merchant/products/3"), Some(&token), configure(store)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Product deleted successfully");
}

#[actix_web::test]
async fn my_products() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(4, Role::Merchant);
    let mut store = MockStore::new();
    store
        .expect_fetch_products_for_merchant()
        .withf(|mid| *mid == MerchantId(4))
        .returning(|_| Ok(vec![product(1, 4, "Lamp", 1000), product(2, 4, "Rug", 5000)]));
    let (status, body) = send(TestRequest::get().uri("/merchant/products"), Some(&token), configure(store)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn browse_products_with_filters() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(7, Role::Customer);
    let mut store = MockStore::new();
    store
        .expect_fetch_products()
        .withf(|q| {
            let sort = q.sort.as_ref();
            q.filter.category.as_deref() == Some("home") &&
                q.filter.min_price == Some(Money::from_cents(500)) &&
                q.filter.max_price == Some(Money::from_cents(2000)) &&
                sort.is_some_and(|s| s.field == "price" && s.direction == SortDirection::Descending)
        })
        .times(1)
        .returning(|_| Ok(vec![product(2, 4, "Rug", 1500), product(1, 4, "Lamp", 1000)]));
    let req = TestRequest::get().uri("/customer/products?category=home&minPrice=500&maxPrice=20.00&sort=-price");
    let (status, body) = send(req, Some(&token), configure(store)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["id"], 2);
}

#[actix_web::test]
async fn browse_products_rejects_bad_bounds() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(7, Role::Customer);
    let mut store = MockStore::new();
    store.expect_fetch_products().never();
    let req = TestRequest::get().uri("/customer/products?minPrice=cheap");
    let (status, _) = send(req, Some(&token), configure(store)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn only_merchants_manage_products() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(7, Role::Customer);
    let req = TestRequest::post().uri("/merchant/products").set_json(json!({"name": "Lamp", "price": 100, "qty": 1}));
    let (status, _) = send(req, Some(&token), configure(MockStore::new())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let merchant = issue_token(4, Role::Merchant);
    let (status, _) = send(TestRequest::get().uri("/customer/products"), Some(&merchant), configure(MockStore::new())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
