//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Thin translators between Diesel rows and domain types; no business logic
//! lives here. Row structs (`models`) and table definitions (`schema`) stay
//! internal to this module. Connections come from a `bb8` pool via
//! `diesel-async`.

mod diesel_piece_repository;
mod diesel_stage_detail_repository;
mod diesel_user_repository;
mod diesel_user_stats_query;
mod models;
mod pool;
mod schema;

pub use diesel_piece_repository::DieselPieceRepository;
pub use diesel_stage_detail_repository::DieselStageDetailRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use diesel_user_stats_query::DieselUserStatsQuery;
pub use pool::{DbPool, PoolConfig, PoolError};

use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

/// Migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run pending migrations against the given database.
///
/// Uses a dedicated synchronous connection on a blocking thread; the async
/// pool is built afterwards.
pub async fn run_migrations(database_url: &str) -> Result<(), PoolError> {
    let url = database_url.to_owned();
    tokio::task::spawn_blocking(move || {
        use diesel::Connection;

        let mut conn = diesel::PgConnection::establish(&url)
            .map_err(|error| PoolError::build(error.to_string()))?;
        conn.run_pending_migrations(MIGRATIONS)
            .map_err(|error| PoolError::build(error.to_string()))?;
        Ok(())
    })
    .await
    .map_err(|error| PoolError::build(error.to_string()))?
}
