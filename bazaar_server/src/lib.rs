//! # Bazaar server
//! This crate hosts the HTTP server for the Bazaar backend. It is responsible for:
//! * Authenticating admins, merchants and customers, and issuing access tokens.
//! * Checking the access token and role of every protected request.
//! * Translating requests into calls on the `bazaar_engine` APIs, and their results and errors into JSON envelopes.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! Every response body has the shape `{ "success": bool, "message": string, "data"?: any }`.
//! * `GET /health`: A health check route that returns a 200 OK response.
//! * `POST /api/{admin,customer,merchant}/login`: Exchange an email and password for an access token.
//! * `POST /api/{customer,merchant}/signup`: Register a new account.
//! * `GET /api/admin/{customers,merchants}?name=`: Search the account directories.
//! * `DELETE /api/admin/{customer,merchant}/{id}`: Remove an account.
//! * `GET /api/customer/products`: Browse the catalog.
//! * `GET|POST /api/customer/cart`, `PATCH|DELETE /api/customer/cart/{product_id}`: Manage the cart.
//! * `POST|GET /api/customer/order`, `GET /api/customer/orders`: Check out, and view orders.
//! * `GET|POST /api/merchant/products`, `PUT|DELETE /api/merchant/products/{id}`: Manage a merchant's products.
//! * `GET /api/merchant/orders`: Orders that contain the merchant's products.
//!
//! Protected routes expect an `Authorization: Bearer <token>` header.

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod middleware;
pub mod routes;
pub mod server;
