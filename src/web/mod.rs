//! HTTP API for classhub.
//!
//! axum router, handlers, DTOs and middleware. All API routes live under
//! `/api`; every response uses the `{statusCode, data, message, success}`
//! envelope.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::create_router;
pub use server::WebServer;
