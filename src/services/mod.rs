//! # Services Module
//!
//! Business logic that sits between the HTTP routes and the credential store.

pub mod auth_service;

pub use auth_service::{AuthPolicy, AuthService};
