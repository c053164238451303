use chrono::Utc;
use log::{debug, warn};
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    catalog::{ProductQuery, SortDirection, SortOrder},
    db_types::{MerchantId, NewProduct, Product, ProductId, ProductUpdate},
};

pub async fn fetch_product(product_id: ProductId, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    let product = sqlx::query_as("SELECT * FROM products WHERE id = $1").bind(product_id).fetch_optional(conn).await?;
    Ok(product)
}

pub async fn fetch_products_for_merchant(
    merchant_id: MerchantId,
    conn: &mut SqliteConnection,
) -> Result<Vec<Product>, sqlx::Error> {
    let products = sqlx::query_as("SELECT * FROM products WHERE merchant_id = $1 ORDER BY id")
        .bind(merchant_id)
        .fetch_all(conn)
        .await?;
    Ok(products)
}

fn sort_column(order: &SortOrder) -> Option<&'static str> {
    match order.field.as_str() {
        "id" => Some("id"),
        "name" => Some("name"),
        "price" => Some("price"),
        "qty" => Some("qty"),
        "category" => Some("category"),
        "created_at" => Some("created_at"),
        field => {
            warn!("🗃️ Products cannot be sorted by '{field}'. The sort order will be ignored.");
            None
        },
    }
}

/// Fetches products according to the filter in `query`. Ties (and unsortable queries) are ordered by id.
pub async fn fetch_products(query: &ProductQuery, conn: &mut SqliteConnection) -> Result<Vec<Product>, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT * FROM products ");
    let filter = &query.filter;
    if !filter.is_empty() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(category) = &filter.category {
        where_clause.push("category = ");
        where_clause.push_bind_unseparated(category.clone());
    }
    if let Some(min) = filter.min_price {
        where_clause.push("price >= ");
        where_clause.push_bind_unseparated(min);
    }
    if let Some(max) = filter.max_price {
        where_clause.push("price <= ");
        where_clause.push_bind_unseparated(max);
    }
    match query.sort.as_ref().and_then(|s| sort_column(s).map(|c| (c, s.direction))) {
        Some((column, SortDirection::Ascending)) => builder.push(format!(" ORDER BY {column} ASC, id ASC")),
        Some((column, SortDirection::Descending)) => builder.push(format!(" ORDER BY {column} DESC, id ASC")),
        None => builder.push(" ORDER BY id ASC"),
    };
    let products = builder.build_query_as::<Product>().fetch_all(conn).await?;
    debug!("🗃️ Product query returned {} results", products.len());
    Ok(products)
}

pub async fn insert_product(product: NewProduct, conn: &mut SqliteConnection) -> Result<Product, sqlx::Error> {
    let now = Utc::now();
    let product = sqlx::query_as(
        r#"
            INSERT INTO products (name, category, price, qty, merchant_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING *;
        "#,
    )
    .bind(product.name)
    .bind(product.category)
    .bind(product.price)
    .bind(product.qty)
    .bind(product.merchant_id)
    .bind(now)
    .fetch_all(conn)
    .await?
    .pop()
    .ok_or(sqlx::Error::RowNotFound)?;
    Ok(product)
}

/// Updates the product if it belongs to the merchant. An empty update simply returns the product.
pub async fn update_product(
    product_id: ProductId,
    merchant_id: MerchantId,
    update: ProductUpdate,
    conn: &mut SqliteConnection,
) -> Result<Option<Product>, sqlx::Error> {
    if update.is_empty() {
        let product = fetch_product(product_id, conn).await?;
        return Ok(product.filter(|p| p.merchant_id == merchant_id));
    }
    let mut builder = QueryBuilder::new("UPDATE products SET ");
    let mut set_clause = builder.separated(", ");
    if let Some(name) = update.name {
        set_clause.push("name = ");
        set_clause.push_bind_unseparated(name);
    }
    if let Some(category) = update.category {
        set_clause.push("category = ");
        set_clause.push_bind_unseparated(category);
    }
    if let Some(price) = update.price {
        set_clause.push("price = ");
        set_clause.push_bind_unseparated(price);
    }
    if let Some(qty) = update.qty {
        set_clause.push("qty = ");
        set_clause.push_bind_unseparated(qty);
    }
    set_clause.push("updated_at = ");
    set_clause.push_bind_unseparated(Utc::now());
    builder.push(" WHERE id = ");
    builder.push_bind(product_id);
    builder.push(" AND merchant_id = ");
    builder.push_bind(merchant_id);
    builder.push(" RETURNING *");
    let product = builder.build_query_as::<Product>().fetch_all(conn).await?.pop();
    Ok(product)
}

pub async fn delete_product(
    product_id: ProductId,
    merchant_id: MerchantId,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1 AND merchant_id = $2")
        .bind(product_id)
        .bind(merchant_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_products_for_merchant(
    merchant_id: MerchantId,
    conn: &mut SqliteConnection,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM products WHERE merchant_id = $1").bind(merchant_id).execute(conn).await?;
    Ok(result.rows_affected())
}
