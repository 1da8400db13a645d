//! # Server Module
//!
//! HTTP server setup and route configuration for the VTECHSOFT API.

use anyhow::{Context, Result};
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::get,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{JwtService, PasswordService};
use crate::config::Config;
use crate::database::{DatabaseConnection, migrations};
use crate::repository::{EphemeralRepository, PostgresUserRepository};
use crate::routes::{auth, health};
use crate::services::{AuthPolicy, AuthService};

/// Application state shared across all route handlers
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub jwt_service: Arc<JwtService>,
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true) // Allow cookies for auth
}

/// Assemble the full router: public routes, auth routes, JSON 404 fallback
pub fn router(app_state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(health::root))
        .route("/api/health", get(health::health))
        .merge(auth::create_auth_routes(&app_state))
        .fallback(health::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(allowed_origins)),
        )
        .with_state(app_state)
}

/// Starts the VTECHSOFT HTTP server.
///
/// The credential store is optional at startup: migrations and the initial
/// health check only warn on failure, and requests fall back to demo mode
/// while the database is unreachable.
pub async fn start(config: Config) -> Result<()> {
    let db = DatabaseConnection::new(&config.database)?;

    match migrations::run_migrations(db.pool()).await {
        Ok(()) => tracing::info!("✅ Database migrations are up to date"),
        Err(e) => tracing::warn!("⚠️  Skipping migrations, database unavailable: {:#}", e),
    }
    match db.health_check().await {
        Ok(()) => tracing::info!("✅ Database connected"),
        Err(e) => tracing::warn!("⚠️  Database not connected, demo mode active: {:#}", e),
    }

    let jwt_service = Arc::new(JwtService::new(
        &config.auth.jwt_secret,
        config.auth.token_lifetime,
    )?);
    let auth_service = AuthService::new(
        Arc::new(PostgresUserRepository::new(db.pool().clone())),
        Arc::new(EphemeralRepository::new(
            config.auth.demo_cache_capacity,
            config.auth.demo_idle_ttl,
        )),
        jwt_service.clone(),
        PasswordService::new()?,
        AuthPolicy::from(&config.auth),
    );

    let app_state = AppState {
        auth_service: Arc::new(auth_service),
        jwt_service,
    };
    let app = router(app_state, &config.server.allowed_origins);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!("🚀 Server running on http://{}", addr);
    tracing::info!("🏥 Health check available at http://{}/api/health", addr);
    tracing::info!("🔐 Auth endpoints available at http://{}/api/auth/*", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("🛑 Shutdown signal received");
}
