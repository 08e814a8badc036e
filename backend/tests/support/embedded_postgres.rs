//! Database provisioning on an embedded cluster.
//!
//! Databases are dropped and recreated with `postgres` so Diesel's
//! transaction handling never wraps `DROP DATABASE`. The schema comes from
//! the crate's own embedded migrations.

use bluecaller::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use pg_embedded_setup_unpriv::TestCluster;
use postgres::{Client, NoTls};
use tokio::runtime::Runtime;

/// Render a `postgres` error with its SQLSTATE and detail.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };
    let mut summary = format!(
        "postgres error {:?}: {}",
        db_error.code(),
        db_error.message()
    );
    if let Some(detail) = db_error.detail() {
        summary.push_str("; detail: ");
        summary.push_str(detail);
    }
    summary
}

/// Recreate `name` empty and return its connection URL.
pub fn reset_database(cluster: &TestCluster, name: &str) -> Result<String, String> {
    let admin_url = cluster.connection().database_url("postgres");
    let mut client = Client::connect(&admin_url, NoTls).map_err(|err| format_postgres_error(&err))?;
    let quoted = name.replace('"', "\"\"");
    client
        .batch_execute(&format!(r#"DROP DATABASE IF EXISTS "{quoted}""#))
        .map_err(|err| format_postgres_error(&err))?;
    client
        .batch_execute(&format!(r#"CREATE DATABASE "{quoted}""#))
        .map_err(|err| format_postgres_error(&err))?;
    Ok(cluster.connection().database_url(name))
}

/// Migrate `url` and open a pool of `max_size` connections on it.
pub fn migrated_pool(runtime: &Runtime, url: &str, max_size: u32) -> Result<DbPool, String> {
    runtime.block_on(async {
        run_migrations(url).await.map_err(|err| err.to_string())?;
        DbPool::new(PoolConfig::new(url).with_max_size(max_size))
            .await
            .map_err(|err| err.to_string())
    })
}
