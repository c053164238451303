//! The public Bazaar engine APIs. Each is generic over the backend traits it needs.
pub mod accounts_api;
pub mod auth_api;
pub mod cart_api;
pub mod catalog_api;
pub mod errors;
pub mod order_flow_api;
