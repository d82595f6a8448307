//! Database connection pool utilities.

use diesel::pg::PgConnection;
use diesel::r2d2::{self, ConnectionManager};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

/// Pooled PostgreSQL connections for the GeoLens server.
pub type DbPool = r2d2::Pool<ConnectionManager<PgConnection>>;

/// Errors raised while preparing the database.
pub type DbInitError = Box<dyn std::error::Error + Send + Sync>;

/// Embedded Diesel migrations.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Build the pool for `database_url` and apply pending migrations.
pub fn init_pool(database_url: &str) -> Result<DbPool, DbInitError> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = r2d2::Pool::builder().build(manager)?;
    run_migrations(&pool)?;
    Ok(pool)
}

/// Run pending Diesel migrations.
pub fn run_migrations(pool: &DbPool) -> Result<(), DbInitError> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    if !applied.is_empty() {
        log::info!("applied {} database migrations", applied.len());
    }
    Ok(())
}

#[cfg(test)]
#[derive(Debug)]
struct RollbackOnAcquire;

#[cfg(test)]
impl r2d2::CustomizeConnection<PgConnection, r2d2::Error> for RollbackOnAcquire {
    fn on_acquire(&self, conn: &mut PgConnection) -> Result<(), r2d2::Error> {
        use diesel::Connection;

        conn.begin_test_transaction().map_err(r2d2::Error::QueryError)
    }
}

/// Migrated single-connection pool for PostgreSQL tests.
///
/// Everything, migrations included, runs inside one transaction that is
/// rolled back when the pool is dropped.
#[cfg(test)]
pub(crate) fn test_pool() -> DbPool {
    let database_url = std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("set TEST_DATABASE_URL or DATABASE_URL for PostgreSQL tests");
    let pool = r2d2::Pool::builder()
        .max_size(1)
        .connection_customizer(Box::new(RollbackOnAcquire))
        .build(ConnectionManager::<PgConnection>::new(database_url))
        .expect("test pool");
    run_migrations(&pool).expect("test migrations");
    pool
}
