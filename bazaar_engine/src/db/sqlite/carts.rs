use chrono::{DateTime, Utc};
use log::trace;
use sqlx::SqliteConnection;

use crate::{
    cart::{Cart, CartItem},
    checkout::{PricedCart, PricedCartLine},
    db_types::CustomerId,
};

/// Reads the cart header and items. Run this inside a transaction so both reads see the same snapshot.
pub async fn fetch_cart(customer_id: CustomerId, conn: &mut SqliteConnection) -> Result<Option<Cart>, sqlx::Error> {
    let header: Option<(i64, DateTime<Utc>)> =
        sqlx::query_as("SELECT cart_version, cart_updated_at FROM customers WHERE id = $1")
            .bind(customer_id)
            .fetch_optional(&mut *conn)
            .await?;
    let Some((version, updated_at)) = header else {
        return Ok(None);
    };
    let items = fetch_items(customer_id, conn).await?;
    Ok(Some(Cart::new(items, updated_at, version)))
}

pub async fn fetch_items(customer_id: CustomerId, conn: &mut SqliteConnection) -> Result<Vec<CartItem>, sqlx::Error> {
    let items = sqlx::query_as("SELECT product_id, qty FROM cart_items WHERE customer_id = $1 ORDER BY position")
        .bind(customer_id)
        .fetch_all(conn)
        .await?;
    Ok(items)
}

/// Like [`fetch_cart`], but joins each line against the live catalog and includes the customer's address.
pub async fn fetch_priced_cart(
    customer_id: CustomerId,
    conn: &mut SqliteConnection,
) -> Result<Option<PricedCart>, sqlx::Error> {
    let header: Option<(i64, String)> = sqlx::query_as("SELECT cart_version, address FROM customers WHERE id = $1")
        .bind(customer_id)
        .fetch_optional(&mut *conn)
        .await?;
    let Some((version, address)) = header else {
        return Ok(None);
    };
    let lines: Vec<PricedCartLine> = sqlx::query_as(
        r#"
            SELECT cart_items.product_id, cart_items.qty, products.price
            FROM cart_items LEFT JOIN products ON products.id = cart_items.product_id
            WHERE cart_items.customer_id = $1
            ORDER BY cart_items.position
        "#,
    )
    .bind(customer_id)
    .fetch_all(conn)
    .await?;
    Ok(Some(PricedCart { customer_id, address, version, lines }))
}

/// Bumps the cart version, provided it still equals `expected_version`. Returns `false` if another writer got there
/// first (or the customer no longer exists), in which case nothing was changed.
///
/// This must be the first statement of the transaction, so that SQLite takes the write lock before anything is read.
pub async fn claim_version(
    customer_id: CustomerId,
    expected_version: i64,
    updated_at: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE customers SET cart_version = cart_version + 1, cart_updated_at = $1 WHERE id = $2 AND cart_version = $3",
    )
    .bind(updated_at)
    .bind(customer_id)
    .bind(expected_version)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Replaces every line of the cart with `items`, preserving their order.
pub async fn replace_items(
    customer_id: CustomerId,
    items: &[CartItem],
    conn: &mut SqliteConnection,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM cart_items WHERE customer_id = $1").bind(customer_id).execute(&mut *conn).await?;
    for (position, item) in items.iter().enumerate() {
        sqlx::query("INSERT INTO cart_items (customer_id, product_id, qty, position) VALUES ($1, $2, $3, $4)")
            .bind(customer_id)
            .bind(item.product_id)
            .bind(item.qty)
            .bind(position as i64)
            .execute(&mut *conn)
            .await?;
    }
    trace!("🛒️ Stored {} cart lines for {customer_id}", items.len());
    Ok(())
}
