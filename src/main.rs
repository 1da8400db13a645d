//! # VTECHSOFT API
//!
//! Account service for the VTECHSOFT frontend, built with Rust, Axum and Tokio.
//!
//! ## Features
//! - Registration, login and profile management over a JSON HTTP API
//! - Stateless JWT sessions (bearer header or `access_token` cookie)
//! - Argon2 password hashing
//! - PostgreSQL credential store with embedded migrations
//! - Demo mode: when the database is unreachable, accounts are synthesized
//!   in memory so the frontend stays usable
//!
//! ## Architecture
//! - `server`: router assembly and startup
//! - `config`: environment variable configuration
//! - `auth`: tokens, password hashing, request validation and the auth gate
//! - `repository`: credential store trait, PostgreSQL and demo implementations
//! - `services`: the auth flows tying it all together
//! - `routes`: HTTP handlers
//!
//! ## Environment Setup
//! ```bash
//! cp .env.example .env
//! # Set DATABASE_URL and JWT_SECRET
//! ```
//!
//! ## Health Check
//! ```bash
//! curl http://localhost:5000/api/health
//! ```

mod auth;
mod config;
mod database;
mod error;
mod repository;
mod routes;
mod server;
mod services;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false) // Don't show module targets for cleaner output
                .compact(),
        )
        .init();

    tracing::info!("🏁 Starting VTECHSOFT API...");
    tracing::info!("📦 Package: {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "🏗️  Build profile: {}",
        if cfg!(debug_assertions) { "debug" } else { "release" }
    );

    let config = match config::Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };
    tracing::debug!("Loaded configuration: {:?}", config);

    if let Err(e) = server::start(config).await {
        tracing::error!("❌ Server failed: {:#}", e);
        std::process::exit(1);
    }
}
