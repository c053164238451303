use chrono::{DateTime, Utc};
use log::debug;
use sqlx::{FromRow, SqliteConnection};

use crate::db_types::{CustomerId, MerchantId, NewOrder, Order, OrderId, OrderLine, OrderStatusType};

#[derive(Debug, Clone, FromRow)]
struct OrderRow {
    id: OrderId,
    customer_id: CustomerId,
    total_price: bazaar_common::Money,
    address: String,
    status: OrderStatusType,
    created_at: DateTime<Utc>,
}

impl OrderRow {
    fn with_lines(self, lines: Vec<OrderLine>) -> Order {
        Order {
            id: self.id,
            customer_id: self.customer_id,
            lines,
            total_price: self.total_price,
            address: self.address,
            status: self.status,
            created_at: self.created_at,
        }
    }
}

/// Inserts the order and its lines. This is not atomic on its own; call it inside a transaction.
///
/// Each line records the merchant that sold the product at the time of the order.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, sqlx::Error> {
    let row: OrderRow = sqlx::query_as(
        r#"
            INSERT INTO orders (customer_id, total_price, address, status, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(order.customer_id)
    .bind(order.total_price)
    .bind(order.address)
    .bind(OrderStatusType::Pending)
    .bind(Utc::now())
    .fetch_all(&mut *conn)
    .await?
    .pop()
    .ok_or(sqlx::Error::RowNotFound)?;
    for (position, line) in order.lines.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO order_items (order_id, position, product_id, qty, price, merchant_id)
            VALUES ($1, $2, $3, $4, $5, (SELECT merchant_id FROM products WHERE id = $3))
            "#,
        )
        .bind(row.id)
        .bind(position as i64)
        .bind(line.product_id)
        .bind(line.qty)
        .bind(line.price)
        .execute(&mut *conn)
        .await?;
    }
    debug!("📦️ {} inserted with {} lines", row.id, order.lines.len());
    Ok(row.with_lines(order.lines))
}

async fn fetch_lines(order_id: OrderId, conn: &mut SqliteConnection) -> Result<Vec<OrderLine>, sqlx::Error> {
    let lines = sqlx::query_as("SELECT product_id, qty, price FROM order_items WHERE order_id = $1 ORDER BY position")
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    Ok(lines)
}

async fn attach_lines(rows: Vec<OrderRow>, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let mut orders = Vec::with_capacity(rows.len());
    for row in rows {
        let lines = fetch_lines(row.id, &mut *conn).await?;
        orders.push(row.with_lines(lines));
    }
    Ok(orders)
}

pub async fn fetch_latest_order(
    customer_id: CustomerId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let row: Option<OrderRow> =
        sqlx::query_as("SELECT * FROM orders WHERE customer_id = $1 ORDER BY created_at DESC, id DESC LIMIT 1")
            .bind(customer_id)
            .fetch_optional(&mut *conn)
            .await?;
    match row {
        Some(row) => {
            let lines = fetch_lines(row.id, conn).await?;
            Ok(Some(row.with_lines(lines)))
        },
        None => Ok(None),
    }
}

/// Orders are returned oldest first.
pub async fn fetch_orders_for_customer(
    customer_id: CustomerId,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, sqlx::Error> {
    let rows = sqlx::query_as("SELECT * FROM orders WHERE customer_id = $1 ORDER BY created_at, id")
        .bind(customer_id)
        .fetch_all(&mut *conn)
        .await?;
    attach_lines(rows, conn).await
}

/// Orders with at least one line sold by the merchant, oldest first. Every line of those orders is returned.
pub async fn fetch_orders_for_merchant(
    merchant_id: MerchantId,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, sqlx::Error> {
    let rows = sqlx::query_as(
        r#"
            SELECT * FROM orders
            WHERE id IN (SELECT order_id FROM order_items WHERE merchant_id = $1)
            ORDER BY created_at, id
        "#,
    )
    .bind(merchant_id)
    .fetch_all(&mut *conn)
    .await?;
    attach_lines(rows, conn).await
}
