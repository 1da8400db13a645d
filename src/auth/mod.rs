//! # Authentication Module
//!
//! Handles JWT token issuance and validation, password hashing, request
//! validation, and the middleware that guards private endpoints.

pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod validation;

pub use jwt::JwtService;
pub use middleware::AuthMiddleware;
pub use password::PasswordService;
