/// Database migration runner
///
/// This module runs the SQL migrations shipped in the crate's
/// `migrations/` directory using sqlx's embedded migrator.
///
/// # Migration Files
///
/// Each migration is a single `{timestamp}_{name}.sql` file applied in
/// timestamp order. Applied versions are tracked in the
/// `_sqlx_migrations` table.
///
/// # Example
///
/// ```no_run
/// use pawshop_shared::db::pool::{create_pool, DatabaseConfig};
/// use pawshop_shared::db::migrations::run_migrations;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
/// run_migrations(&pool).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::postgres::PgPool;
use tracing::{info, warn};

/// Runs all pending database migrations
///
/// # Errors
///
/// Returns an error if a migration file is malformed, a migration fails
/// to execute, or the database connection is lost mid-run. Failed
/// migrations are rolled back where the statements allow it.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Starting database migrations");

    let migrations = sqlx::migrate!("./migrations");

    match migrations.run(pool).await {
        Ok(()) => {
            info!("All database migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}

/// Migration status information
#[derive(Debug, Clone)]
pub struct MigrationStatus {
    /// Number of migrations that have been applied
    pub applied_migrations: usize,

    /// Latest applied migration version (timestamp)
    pub latest_version: Option<i64>,
}

/// Gets the current migration status
///
/// # Errors
///
/// Returns an error if the `_sqlx_migrations` table cannot be queried
/// (for example, when no migration has ever run).
pub async fn get_migration_status(pool: &PgPool) -> Result<MigrationStatus, sqlx::Error> {
    let rows: Vec<(i64,)> =
        sqlx::query_as("SELECT version FROM _sqlx_migrations ORDER BY version")
            .fetch_all(pool)
            .await?;

    Ok(MigrationStatus {
        applied_migrations: rows.len(),
        latest_version: rows.last().map(|(v,)| *v),
    })
}
