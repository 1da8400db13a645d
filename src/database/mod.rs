//! # Database Module
//!
//! PostgreSQL integration using tokio-postgres with a deadpool connection pool.
//! Includes connection management, row models, and migrations.

pub mod connection;
pub mod migrations;
pub mod models;

pub use connection::DatabaseConnection;
pub use models::*;
