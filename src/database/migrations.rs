//! Database Migrations
//!
//! Embedded refinery migrations for tokio-postgres (see `migrations/`).

use anyhow::{Context, Result};
use deadpool_postgres::Pool;

mod embedded {
    refinery::embed_migrations!("migrations");
}

/// Run all pending migrations
pub async fn run_migrations(pool: &Pool) -> Result<()> {
    tracing::info!("🔄 Running database migrations...");

    let mut object = pool
        .get()
        .await
        .context("Failed to get connection for migrations")?;
    let client: &mut tokio_postgres::Client = &mut object;

    let report = embedded::migrations::runner()
        .run_async(client)
        .await
        .context("Failed to apply migrations")?;

    tracing::info!(
        "✅ Database migrations completed ({} applied)",
        report.applied_migrations().len()
    );
    Ok(())
}
