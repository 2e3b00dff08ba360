use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use std::time::Duration;

/// Establish a connection to the database with connection pooling.
///
/// An in-memory SQLite database lives inside a single connection, so the pool is pinned
/// to one connection for `sqlite::memory:` URLs.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> anyhow::Result<DatabaseConnection> {
    let in_memory = database_url.starts_with("sqlite::memory:");
    let (max, min) = if in_memory { (1, 1) } else { (20, 2) };

    let mut opts = ConnectOptions::new(database_url);
    opts.max_connections(max)
        .min_connections(min)
        .connect_timeout(Duration::from_secs(5))
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(300))
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(false);

    let db = Database::connect(opts).await?;
    tracing::debug!(backend = ?db.get_database_backend(), in_memory, "Database pool ready");
    Ok(db)
}
