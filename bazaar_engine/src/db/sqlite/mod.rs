//! # SQLite backend
//!
//! The low-level modules (`products`, `carts`, `orders`, `accounts`) are plain functions that accept a
//! `&mut SqliteConnection`. Callers obtain a connection from the pool, or open a transaction and pass `&mut tx`
//! through, without any other changes. [`SqliteDatabase`] stitches them together into the backend traits.
//!
//! Statements with a `RETURNING` clause are always read with `fetch_all`, so that they run to completion before the
//! surrounding transaction commits.
use std::{env, str::FromStr, time::Duration};

use log::info;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Error as SqlxError,
    SqlitePool,
};

pub mod accounts;
pub mod carts;
pub mod orders;
pub mod products;
mod sqlite_impl;

pub use sqlite_impl::SqliteDatabase;

const SQLITE_DB_URL: &str = "sqlite://data/bazaar.db";
pub const DEFAULT_DB_TIMEOUT: Duration = Duration::from_secs(5);

pub fn db_url() -> String {
    let result = env::var("BZR_DATABASE_URL").unwrap_or_else(|_| {
        info!("🗃️ BZR_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("🗃️ Using database URL: {result}");
    result
}

/// Opens a pool in WAL mode. `timeout` bounds both the wait for a free connection and the wait on a locked database.
pub async fn new_pool(url: &str, max_connections: u32, timeout: Duration) -> Result<SqlitePool, SqlxError> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(timeout)
        .foreign_keys(true);
    let pool =
        SqlitePoolOptions::new().max_connections(max_connections).acquire_timeout(timeout).connect_with(options).await?;
    Ok(pool)
}
