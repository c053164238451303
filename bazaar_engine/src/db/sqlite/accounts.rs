use chrono::Utc;
use sqlx::SqliteConnection;

use crate::db_types::{Admin, Customer, CustomerId, Merchant, MerchantId, NewAdmin, NewCustomer, NewMerchant};

//--------------------------------------       Customers      ---------------------------------------------------------

pub async fn insert_customer(customer: NewCustomer, conn: &mut SqliteConnection) -> Result<Customer, sqlx::Error> {
    let now = Utc::now();
    let customer = sqlx::query_as(
        r#"
            INSERT INTO customers (name, email, password_hash, phone, address, cart_version, cart_updated_at,
                created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, 0, $6, $6, $6)
            RETURNING *;
        "#,
    )
    .bind(customer.name)
    .bind(customer.email)
    .bind(customer.password_hash)
    .bind(customer.phone)
    .bind(customer.address)
    .bind(now)
    .fetch_all(conn)
    .await?
    .pop()
    .ok_or(sqlx::Error::RowNotFound)?;
    Ok(customer)
}

pub async fn fetch_customer(
    customer_id: CustomerId,
    conn: &mut SqliteConnection,
) -> Result<Option<Customer>, sqlx::Error> {
    let customer =
        sqlx::query_as("SELECT * FROM customers WHERE id = $1").bind(customer_id).fetch_optional(conn).await?;
    Ok(customer)
}

pub async fn fetch_customer_by_email(email: &str, conn: &mut SqliteConnection) -> Result<Option<Customer>, sqlx::Error> {
    let customer = sqlx::query_as("SELECT * FROM customers WHERE email = $1").bind(email).fetch_optional(conn).await?;
    Ok(customer)
}

pub async fn fetch_customers(conn: &mut SqliteConnection) -> Result<Vec<Customer>, sqlx::Error> {
    let customers = sqlx::query_as("SELECT * FROM customers ORDER BY id").fetch_all(conn).await?;
    Ok(customers)
}

pub async fn delete_customer(customer_id: CustomerId, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    sqlx::query("DELETE FROM cart_items WHERE customer_id = $1").bind(customer_id).execute(&mut *conn).await?;
    let result = sqlx::query("DELETE FROM customers WHERE id = $1").bind(customer_id).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}

//--------------------------------------       Merchants      ---------------------------------------------------------

pub async fn insert_merchant(merchant: NewMerchant, conn: &mut SqliteConnection) -> Result<Merchant, sqlx::Error> {
    let merchant = sqlx::query_as(
        r#"
            INSERT INTO merchants (owner_name, email, password_hash, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(merchant.owner_name)
    .bind(merchant.email)
    .bind(merchant.password_hash)
    .bind(Utc::now())
    .fetch_all(conn)
    .await?
    .pop()
    .ok_or(sqlx::Error::RowNotFound)?;
    Ok(merchant)
}

pub async fn fetch_merchant(
    merchant_id: MerchantId,
    conn: &mut SqliteConnection,
) -> Result<Option<Merchant>, sqlx::Error> {
    let merchant =
        sqlx::query_as("SELECT * FROM merchants WHERE id = $1").bind(merchant_id).fetch_optional(conn).await?;
    Ok(merchant)
}

pub async fn fetch_merchant_by_email(email: &str, conn: &mut SqliteConnection) -> Result<Option<Merchant>, sqlx::Error> {
    let merchant = sqlx::query_as("SELECT * FROM merchants WHERE email = $1").bind(email).fetch_optional(conn).await?;
    Ok(merchant)
}

pub async fn fetch_merchants(conn: &mut SqliteConnection) -> Result<Vec<Merchant>, sqlx::Error> {
    let merchants = sqlx::query_as("SELECT * FROM merchants ORDER BY id").fetch_all(conn).await?;
    Ok(merchants)
}

/// Deletes the merchant row only. Remove the merchant's products first, in the same transaction.
pub async fn delete_merchant(merchant_id: MerchantId, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM merchants WHERE id = $1").bind(merchant_id).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}

//--------------------------------------        Admins        ---------------------------------------------------------

pub async fn upsert_admin(admin: NewAdmin, conn: &mut SqliteConnection) -> Result<Admin, sqlx::Error> {
    let admin = sqlx::query_as(
        r#"
            INSERT INTO admins (name, email, password_hash) VALUES ($1, $2, $3)
            ON CONFLICT (email) DO UPDATE SET name = excluded.name, password_hash = excluded.password_hash
            RETURNING *;
        "#,
    )
    .bind(admin.name)
    .bind(admin.email)
    .bind(admin.password_hash)
    .fetch_all(conn)
    .await?
    .pop()
    .ok_or(sqlx::Error::RowNotFound)?;
    Ok(admin)
}

pub async fn fetch_admin_by_email(email: &str, conn: &mut SqliteConnection) -> Result<Option<Admin>, sqlx::Error> {
    let admin = sqlx::query_as("SELECT * FROM admins WHERE email = $1").bind(email).fetch_optional(conn).await?;
    Ok(admin)
}
