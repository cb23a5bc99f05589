//! PostgreSQL persistence for the live-presence monitor.
//!
//! Layout follows the repository pattern: `models` holds row structs and
//! DTOs, `repositories` holds zero-sized structs with async query methods
//! taking `&PgPool`, and [`store`] adapts them to the seams in
//! `streamwatch-core`.

pub mod models;
pub mod repositories;
pub mod store;

use sqlx::postgres::PgPoolOptions;

pub type DbPool = sqlx::PgPool;

/// Embedded migrations, shared by startup and `sqlx::test`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../db/migrations");

/// Create a connection pool from a database URL.
///
/// Sized at 20 connections; the monitor validates at startup that its
/// worker concurrency does not exceed this.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(MAX_POOL_CONNECTIONS)
        .connect(database_url)
        .await
}

/// Maximum outstanding connections in the pool created by [`create_pool`].
pub const MAX_POOL_CONNECTIONS: u32 = 20;

/// Verify the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply any pending migrations.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}
