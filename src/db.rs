//! Database connection pool management

use anyhow::{Context, Result};
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};
use std::str::FromStr;
use std::time::Duration;

use crate::auth::password;
use crate::config::Settings;
use crate::domain::accounts::UserRole;

/// Create a PostgreSQL connection pool with optimized settings
pub async fn create_pool(settings: &Settings) -> Result<PgPool> {
    let connect_options = PgConnectOptions::from_str(&settings.database_url)
        .context("Invalid DATABASE_URL")?
        .application_name("heavenknows-backend");

    let pool = PgPoolOptions::new()
        .max_connections(settings.database_max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(300))
        .max_lifetime(Duration::from_secs(1800))
        .connect_with(connect_options)
        .await
        .context("Failed to connect to PostgreSQL")?;

    tracing::info!(
        max_connections = settings.database_max_connections,
        "Database connection pool established"
    );

    Ok(pool)
}

/// Run pending SQL migrations from `migrations/`.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");
    Ok(())
}

/// Seed the admin account from `ADMIN_EMAIL`/`ADMIN_PASSWORD` when both are
/// set. Admin accounts cannot be created through the public API.
pub async fn ensure_admin_account(pool: &PgPool, settings: &Settings) -> Result<()> {
    let (Some(email), Some(pass)) = (&settings.admin_email, &settings.admin_password) else {
        return Ok(());
    };

    let email = email.trim().to_lowercase();
    let hash = password::hash_password(pass).context("Failed to hash admin password")?;

    let inserted = sqlx::query(
        r#"
        INSERT INTO users (email, password_hash, first_name, role)
        VALUES ($1, $2, 'Admin', $3)
        ON CONFLICT (email) DO NOTHING
        "#,
    )
    .bind(&email)
    .bind(&hash)
    .bind(UserRole::Admin)
    .execute(pool)
    .await
    .context("Failed to seed admin account")?;

    if inserted.rows_affected() > 0 {
        tracing::info!(email = %email, "Admin account created");
    }

    Ok(())
}

/// Lightweight health check for database connectivity
pub async fn health_check(pool: &PgPool) -> bool {
    sqlx::query("SELECT 1").fetch_one(pool).await.is_ok()
}
