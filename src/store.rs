//! PostgreSQL document-store plumbing: database/schema bootstrap and per-resource
//! tables. Every resource table lives in the schema named by `StoreConfig::schema`.

use crate::config::StoreConfig;
use crate::error::{AppError, ConfigError};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::ConnectOptions;
use sqlx::PgPool;
use std::str::FromStr;
use std::time::Duration;

/// Returns the schema-qualified, quoted table name for a resource (e.g. `"hub"."games"`).
pub fn qualified_resource_table(schema: &str, resource: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(resource))
}

/// Create the database if needed and open a pool against it.
pub async fn connect(config: &StoreConfig) -> Result<PgPool, AppError> {
    ensure_database_exists(&config.database_url).await?;
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(&config.database_url)
        .await?;
    tracing::info!(schema = %config.schema, "connected to document store");
    Ok(pool)
}

/// Create schema if not exists.
pub async fn ensure_schema(pool: &PgPool, schema: &str) -> Result<(), AppError> {
    sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", quote_ident(schema)))
        .execute(pool)
        .await?;
    Ok(())
}

/// Create the table backing one resource. `seq` keeps insertion order stable;
/// `id` is the durable item identifier.
pub async fn ensure_resource_table(pool: &PgPool, schema: &str, resource: &str) -> Result<(), AppError> {
    let q_table = qualified_resource_table(schema, resource);
    let ddl = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            id TEXT PRIMARY KEY,
            seq BIGSERIAL NOT NULL,
            document JSONB NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
        q_table
    );
    sqlx::query(&ddl).execute(pool).await?;
    Ok(())
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database on the same server to run CREATE DATABASE. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin, db_name) = admin_options(database_url)?;
    let db_name = match db_name {
        Some(name) if !name.is_empty() && name != "postgres" => name,
        _ => return Ok(()),
    };
    let mut conn: sqlx::PgConnection = admin.connect().await.map_err(AppError::Db)?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await
        .map_err(AppError::Db)?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await
            .map_err(AppError::Db)?;
    }
    Ok(())
}

/// Options for the maintenance `postgres` database on the same server (host, credentials
/// and TLS settings preserved), plus the database named by the URL, if any.
fn admin_options(database_url: &str) -> Result<(PgConnectOptions, Option<String>), AppError> {
    let opts = PgConnectOptions::from_str(database_url)
        .map_err(|e| ConfigError::Validation(format!("invalid DATABASE_URL: {}", e)))?;
    let db_name = opts.get_database().map(str::to_string);
    Ok((opts.database("postgres"), db_name))
}

pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgSslMode;

    #[test]
    fn admin_options_keep_server_and_database() {
        let (admin, db) = admin_options("postgres://u:p@localhost:5432/games_hub").unwrap();
        assert_eq!(db.as_deref(), Some("games_hub"));
        assert_eq!(admin.get_database(), Some("postgres"));
        assert_eq!(admin.get_host(), "localhost");
        assert_eq!(admin.get_port(), 5432);
        assert_eq!(admin.get_username(), "u");
    }

    #[test]
    fn url_without_path_keeps_host() {
        let (admin, db) = admin_options("postgres://localhost").unwrap();
        assert_eq!(admin.get_host(), "localhost");
        assert_eq!(admin.get_database(), Some("postgres"));
        assert_ne!(db.as_deref(), Some("localhost"));
    }

    #[test]
    fn admin_options_keep_ssl_mode() {
        let (admin, db) = admin_options("postgres://u:p@db.example.com/games_hub?sslmode=require").unwrap();
        assert_eq!(db.as_deref(), Some("games_hub"));
        assert_eq!(admin.get_host(), "db.example.com");
        assert!(matches!(admin.get_ssl_mode(), PgSslMode::Require));
    }

    #[test]
    fn rejects_unparseable_url() {
        assert!(matches!(
            admin_options("not a url"),
            Err(AppError::Config(ConfigError::Validation(_)))
        ));
    }

    #[test]
    fn quotes_identifiers() {
        assert_eq!(qualified_resource_table("hub", "games"), "\"hub\".\"games\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }
}
