use bazaar_common::Money;
use bazaar_engine::{
    cart::QtyAction,
    db_types::{NewProduct, ProductUpdate},
    CartApiError,
};
use cucumber::{given, then, when};

use crate::cucumber::BazaarWorld;

#[given(expr = "{word} sells {string} for {word}")]
async fn sells_product(world: &mut BazaarWorld, merchant: String, product: String, price: String) {
    let merchant_id = world.merchant(&merchant).id;
    let price = price.parse::<Money>().expect("Invalid price");
    let new_product = NewProduct::new(product.clone(), price, 100, merchant_id);
    let p = world.system().catalog.add_product(new_product).await.expect("Error adding product");
    world.products.insert(product, p);
}

#[when(expr = "{word} adds {int} x {string} to the cart")]
async fn add_to_cart(world: &mut BazaarWorld, customer: String, qty: i64, product: String) {
    let customer_id = world.customer(&customer).id;
    let product_id = world.product(&product).id;
    world.system().carts.add_item(customer_id, product_id, qty).await.expect("Error adding to cart");
}

#[when(expr = "{word} {word}s {string}")]
async fn adjust(world: &mut BazaarWorld, customer: String, action: String, product: String) {
    let action = action.parse::<QtyAction>().expect("Unknown action");
    let customer_id = world.customer(&customer).id;
    let product_id = world.product(&product).id;
    world.system().carts.adjust_qty(customer_id, product_id, action).await.expect("Error adjusting quantity");
}

#[when(expr = "{word} removes {string} from the cart")]
async fn remove_from_cart(world: &mut BazaarWorld, customer: String, product: String) {
    let customer_id = world.customer(&customer).id;
    let product_id = world.product(&product).id;
    world.system().carts.remove_item(customer_id, product_id).await.expect("Error removing from cart");
}

#[when(expr = "{word} changes the price of {string} to {word}")]
async fn change_price(world: &mut BazaarWorld, merchant: String, product: String, price: String) {
    let merchant_id = world.merchant(&merchant).id;
    let product_id = world.product(&product).id;
    let update = ProductUpdate::default().with_price(price.parse().expect("Invalid price"));
    world.system().catalog.edit_product(merchant_id, product_id, update).await.expect("Error editing product");
}

#[when(expr = "{word} checks out")]
async fn check_out(world: &mut BazaarWorld, customer: String) {
    let customer_id = world.customer(&customer).id;
    let result = world.system().orders.place_order(customer_id).await;
    world.last_order = Some(result);
}

#[then(expr = "{word}'s cart contains {int} x {string}")]
async fn cart_contains(world: &mut BazaarWorld, customer: String, qty: i64, product: String) {
    let customer_id = world.customer(&customer).id;
    let product_id = world.product(&product).id;
    let cart = world.system().carts.view_cart(customer_id).await.expect("Error fetching cart");
    let item = cart.get(product_id).unwrap_or_else(|| panic!("{product} is not in the cart"));
    assert_eq!(item.qty, qty);
}

#[then(expr = "{word}'s cart has {int} lines")]
async fn cart_lines(world: &mut BazaarWorld, customer: String, lines: usize) {
    let customer_id = world.customer(&customer).id;
    let cart = world.system().carts.view_cart(customer_id).await.expect("Error fetching cart");
    assert_eq!(cart.len(), lines);
}

#[then(expr = "the order total is {word}")]
async fn order_total(world: &mut BazaarWorld, total: String) {
    let order = match &world.last_order {
        Some(Ok(order)) => order,
        other => panic!("Expected a placed order, got {other:?}"),
    };
    assert_eq!(order.total_price, total.parse::<Money>().expect("Invalid total"));
}

#[then(expr = "the checkout fails because the cart is empty")]
async fn checkout_failed_empty(world: &mut BazaarWorld) {
    assert!(matches!(world.last_order, Some(Err(CartApiError::EmptyCart))), "{:?}", world.last_order);
}

#[then(expr = "{word}'s latest order is for {int} x {string} at {word}")]
async fn latest_order(world: &mut BazaarWorld, customer: String, qty: i64, product: String, price: String) {
    let customer_id = world.customer(&customer).id;
    let product_id = world.product(&product).id;
    let order = world.system().orders.view_order(customer_id).await.expect("Error fetching order");
    let line = order.lines.iter().find(|l| l.product_id == product_id).expect("Product is not in the order");
    assert_eq!(line.qty, qty);
    assert_eq!(line.price, price.parse::<Money>().expect("Invalid price"));
}

#[then(expr = "{word}'s latest order ships to {string}")]
async fn order_address(world: &mut BazaarWorld, customer: String, address: String) {
    let customer_id = world.customer(&customer).id;
    let order = world.system().orders.view_order(customer_id).await.expect("Error fetching order");
    assert_eq!(order.address, address);
}
