//! Server binary: loads config (`HUB_CONFIG`, else `config/hub.json` in the working
//! directory, else the built-in in-memory sample), then mounts one CRUD router per
//! resource under `/api`.
//!
//! Run from repo root: `cargo run -p hub-server`
//! `config/hub.json` mounts the Postgres-backed `games` resource; without a database,
//! run with `HUB_STARTUP=degraded` so `games` answers 503 instead of aborting startup.

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("resource_hub=info,tower_http=info")),
        )
        .init();

    let config = resource_hub::load().await?;
    tracing::info!(
        resources = config.resources.len(),
        startup = ?config.server.startup,
        "starting resource hub"
    );
    resource_hub::run(config).await?;
    Ok(())
}
