use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use crate::models::migrator::Migrator;

/// Fresh in-memory database with the full schema applied.
/// Each call returns an isolated instance.
pub async fn setup_test_db() -> DatabaseConnection {
    init_test_logging();

    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// Route log output through the test harness. Safe to call from every test;
/// only the first call installs the subscriber.
pub fn init_test_logging() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}
