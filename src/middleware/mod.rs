//! Middleware del sistema
//!
//! Autenticación bearer para los endpoints protegidos y CORS.

pub mod auth;
pub mod cors;

pub use auth::require_bearer;
pub use cors::cors_layer;
