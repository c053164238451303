//! Bazaar Engine
//!
//! The Bazaar engine holds the core logic of a multi-role (admin, merchant, customer) e-commerce backend. It knows
//! nothing about HTTP.
//!
//! The library is divided into three sections:
//! 1. Pure domain logic. The cart engine ([`mod@cart`]) merges, increments, decrements and removes cart lines; the
//!    order assembler ([`mod@checkout`]) snapshots a priced cart into an immutable order; the catalog filter
//!    ([`mod@catalog`]) turns browse parameters into a storage-independent query; the search matcher
//!    ([`mod@search`]) does multi-word name matching for the admin directory.
//! 2. Storage ([`mod@traits`] and the SQLite backend, [`SqliteDatabase`]). Backends implement the traits so that they
//!    can be plugged into the public APIs.
//! 3. The public APIs ([`CartApi`], [`OrderFlowApi`], [`CatalogApi`], [`AuthApi`], [`AccountApi`]). These apply the
//!    domain logic to stored data, handling optimistic concurrency on carts and atomic checkout.
//!
//! The engine also emits events that can be subscribed to ([`mod@events`]). When an order is placed, an
//! `OrderCreated` event is published to every registered hook.
mod bzr_api;
mod db;

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod db_types;
pub mod events;
pub mod search;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use bzr_api::{
    accounts_api::AccountApi,
    auth_api::{AuthApi, Credentials},
    cart_api::{CartApi, MAX_CART_RETRIES},
    catalog_api::CatalogApi,
    errors::{AccountApiError, AuthApiError, CartApiError, CatalogApiError},
    order_flow_api::OrderFlowApi,
};
#[cfg(feature = "sqlite")]
pub use db::sqlite::{db_url, SqliteDatabase};
