use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use bazaar_common::Money;
use bazaar_engine::{
    checkout::{PricedCart, PricedCartLine},
    db_types::{CustomerId, MerchantId, Order, OrderId, OrderLine, OrderStatusType, ProductId, Role},
    events::EventProducers,
    OrderFlowApi,
};
use chrono::Utc;
use serde_json::json;

use super::{
    helpers::{issue_token, send},
    mocks::MockStore,
};
use crate::routes::{MerchantOrdersRoute, OrderHistoryRoute, PlaceOrderRoute, ViewOrderRoute};

fn configure(store: MockStore) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.service(PlaceOrderRoute::<MockStore>::new())
            .service(ViewOrderRoute::<MockStore>::new())
            .service(OrderHistoryRoute::<MockStore>::new())
            .service(MerchantOrdersRoute::<MockStore>::new())
            .app_data(web::Data::new(OrderFlowApi::new(store, EventProducers::default())));
    }
}

fn priced_cart(lines: &[(i64, i64, Option<i64>)]) -> PricedCart {
    let lines = lines
        .iter()
        .map(|(p, qty, price)| PricedCartLine {
            product_id: ProductId(*p),
            qty: *qty,
            price: price.map(|units| Money::from_cents(units * 100)),
        })
        .collect();
    PricedCart { customer_id: CustomerId(7), address: "1 Main St".into(), version: 3, lines }
}

fn order(id: i64, lines: Vec<OrderLine>) -> Order {
    let total_price = lines.iter().filter_map(|l| l.line_total()).sum();
    Order {
        id: OrderId(id),
        customer_id: CustomerId(7),
        lines,
        total_price,
        address: "1 Main St".into(),
        status: OrderStatusType::Pending,
        created_at: Utc::now(),
    }
}

#[actix_web::test]
async fn place_order_snapshots_the_cart() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(7, Role::Customer);
    let mut store = MockStore::new();
    store
        .expect_fetch_priced_cart()
        .withf(|cid| *cid == CustomerId(7))
        .returning(|_| Ok(Some(priced_cart(&[(1, 2, Some(10)), (2, 1, Some(5))]))));
    store
        .expect_checkout()
        .withf(|cart, order| cart.version == 3 && order.total_price == Money::from_cents(2500))
        .times(1)
        .returning(|_, new_order| Ok(order(11, new_order.lines)));
    let (status, body) = send(TestRequest::post().uri("/customer/order"), Some(&token), configure(store)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Order placed successfully");
    assert_eq!(body["data"]["id"], 11);
    assert_eq!(body["data"]["total_price"], 2500);
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["lines"][0], json!({"product_id": 1, "qty": 2, "price": 1000}));
}

#[actix_web::test]
async fn empty_carts_cannot_be_ordered() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(7, Role::Customer);
    let mut store = MockStore::new();
    store.expect_fetch_priced_cart().returning(|_| Ok(Some(priced_cart(&[]))));
    store.expect_checkout().never();
    let (status, body) = send(TestRequest::post().uri("/customer/order"), Some(&token), configure(store)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "The cart is empty");
}

#[actix_web::test]
async fn deleted_products_block_checkout() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(7, Role::Customer);
    let mut store = MockStore::new();
    store.expect_fetch_priced_cart().returning(|_| Ok(Some(priced_cart(&[(1, 1, Some(10)), (4, 1, None)]))));
    store.expect_checkout().never();
    let (status, body) = send(TestRequest::post().uri("/customer/order"), Some(&token), configure(store)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "product#4 is no longer available");
}

#[actix_web::test]
async fn view_latest_order() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(7, Role::Customer);
    let mut store = MockStore::new();
    store.expect_fetch_latest_order().returning(|_| {
        Ok(Some(order(4, vec![OrderLine { product_id: ProductId(1), qty: 1, price: Money::from_cents(250) }])))
    });
    let (status, body) = send(TestRequest::get().uri("/customer/order"), Some(&token), configure(store)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], 4);
    assert_eq!(body["data"]["total_price"], 250);

    let mut store = MockStore::new();
    store.expect_fetch_latest_order().returning(|_| Ok(None));
    let (status, _) = send(TestRequest::get().uri("/customer/order"), Some(&token), configure(store)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn order_history() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(7, Role::Customer);
    let mut store = MockStore::new();
    store
        .expect_fetch_orders_for_customer()
        .withf(|cid| *cid == CustomerId(7))
        .returning(|_| Ok(vec![order(1, vec![]), order(2, vec![])]));
    let (status, body) = send(TestRequest::get().uri("/customer/orders"), Some(&token), configure(store)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn merchant_orders() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(4, Role::Merchant);
    let mut store = MockStore::new();
    store.expect_fetch_orders_for_merchant().withf(|mid| *mid == MerchantId(4)).returning(|_| Ok(vec![order(9, vec![])]));
    let (status, body) = send(TestRequest::get().uri("/merchant/orders"), Some(&token), configure(store)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["id"], 9);

    let customer_token = issue_token(4, Role::Customer);
    let (status, _) =
        send(TestRequest::get().uri("/merchant/orders"), Some(&customer_token), configure(MockStore::new())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
