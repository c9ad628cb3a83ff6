//! # Actix Middleware Library
//!
//! Shared middleware components for Persona Actix services
//!
//! ## Modules
//! - `jwt_auth`: bearer/cookie session authentication
//! - `logging`: request/response logging through tracing

pub mod jwt_auth;
pub mod logging;

pub use jwt_auth::{AccountId, JwtAuthMiddleware, TOKEN_COOKIE};
pub use logging::Logging;
