use std::time::Duration;

use chrono::Utc;
use sqlx::{PgPool, migrate::MigrateError, postgres::PgPoolOptions};

use crate::{
    auth::hash_password,
    config::AppConfig,
    error::ApiError,
    models::{Administrator, normalize_email},
    repository::AdminRepository,
};

/// Username given to the seeded administrator.
pub const SEED_USERNAME: &str = "admin";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Created,
    AlreadyPresent,
}

/// connect
///
/// Opens the PostgreSQL pool. Startup cannot continue without it.
pub async fn connect(config: &AppConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect(&config.db_url)
        .await
}

/// Applies the embedded schema migrations.
pub async fn migrate(pool: &PgPool) -> Result<(), MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// seed_admin
///
/// Inserts the configured administrator unless an account with that email already
/// exists. Runs once per start; the caller decides what a failure means.
pub async fn seed_admin(
    admins: &dyn AdminRepository,
    config: &AppConfig,
) -> Result<SeedOutcome, ApiError> {
    let email = normalize_email(&config.admin_email);
    if admins.find_by_email(&email).await?.is_some() {
        tracing::debug!("administrator already present, skipping seed");
        return Ok(SeedOutcome::AlreadyPresent);
    }

    let hash = hash_password(config.admin_password.clone()).await?;
    let admin = Administrator::new(SEED_USERNAME, &email, hash, Utc::now());
    admins.insert(&admin).await?;

    tracing::info!(email = %admin.email, "seeded administrator account");
    Ok(SeedOutcome::Created)
}
