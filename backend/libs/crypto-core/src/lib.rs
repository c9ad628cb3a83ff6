//! Shared cryptography helpers for Persona services
//!
//! - `jwt`: session token issuing and validation
//! - `password`: Argon2id password hashing

pub mod jwt;
pub mod password;

pub use jwt::{Claims, JwtKeys};
pub use password::{hash_password, verify_password, PasswordError};
