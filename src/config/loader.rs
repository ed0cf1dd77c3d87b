//! Load config from `HUB_CONFIG`, `config/hub.json`, or the built-in sample, then apply environment overrides.

use crate::config::{validate, HubConfig, StartupPolicy};
use crate::error::ConfigError;
use std::path::Path;

/// Env var naming the config file.
pub const CONFIG_PATH_ENV: &str = "HUB_CONFIG";

pub fn from_json_str(raw: &str) -> Result<HubConfig, ConfigError> {
    serde_json::from_str(raw).map_err(|e| ConfigError::Load(e.to_string()))
}

pub async fn load_from_path(path: impl AsRef<Path>) -> Result<HubConfig, ConfigError> {
    let path = path.as_ref();
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    from_json_str(&raw)
}

/// Overrides from `DATABASE_URL`, `HUB_HOST`, `HUB_PORT`, `HUB_SCHEMA`, `HUB_STARTUP`.
/// `lookup` is `std::env::var` in production; tests pass a closure.
pub fn apply_env_overrides<F>(config: &mut HubConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("DATABASE_URL") {
        config.store.database_url = url;
    }
    if let Some(host) = lookup("HUB_HOST") {
        config.server.host = host;
    }
    if let Some(port) = lookup("HUB_PORT") {
        config.server.port = port
            .parse()
            .map_err(|e| ConfigError::Load(format!("HUB_PORT '{}': {}", port, e)))?;
    }
    if let Some(schema) = lookup("HUB_SCHEMA") {
        config.store.schema = schema;
    }
    if let Some(startup) = lookup("HUB_STARTUP") {
        config.server.startup = startup.parse::<StartupPolicy>().map_err(ConfigError::Load)?;
    }
    Ok(())
}

/// Config file used when `HUB_CONFIG` is unset, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/hub.json";

/// Pick the config source: `explicit` path, else `fallback` if it exists, else the built-in sample.
pub async fn load_source(explicit: Option<String>, fallback: &Path) -> Result<HubConfig, ConfigError> {
    match explicit {
        Some(path) => {
            tracing::info!(path = %path, "loading config file");
            load_from_path(&path).await
        }
        None if fallback.exists() => {
            tracing::info!(path = %fallback.display(), "{} not set, loading default config file", CONFIG_PATH_ENV);
            load_from_path(fallback).await
        }
        None => {
            tracing::info!("{} not set and {} missing, using built-in sample config", CONFIG_PATH_ENV, fallback.display());
            Ok(HubConfig::sample())
        }
    }
}

/// Resolve the full config: `HUB_CONFIG`, then `config/hub.json`, then the sample; env overrides; validation.
pub async fn load() -> Result<HubConfig, ConfigError> {
    let mut config = load_source(std::env::var(CONFIG_PATH_ENV).ok(), Path::new(DEFAULT_CONFIG_PATH)).await?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendKind;
    use std::collections::HashMap;

    #[test]
    fn parses_file_with_defaults() {
        let config = from_json_str(
            r#"{
                "server": { "port": 8080 },
                "resources": [
                    { "name": "games", "backend": "postgres" },
                    { "name": "teas", "seed": [ { "name": "Chai", "brand": "Yogi" } ] }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.api_prefix, "/api");
        assert_eq!(config.store.schema, "hub");
        assert_eq!(config.resources[0].backend, BackendKind::Postgres);
        assert_eq!(config.resources[1].backend, BackendKind::Memory);
        assert_eq!(config.resources[1].seed.len(), 1);
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(from_json_str("{ resources: }"), Err(ConfigError::Load(_))));
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = [
            ("DATABASE_URL", "postgres://db/other"),
            ("HUB_PORT", "6000"),
            ("HUB_STARTUP", "degraded"),
        ]
        .into_iter()
        .collect();
        let mut config = HubConfig::sample();
        apply_env_overrides(&mut config, |k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.store.database_url, "postgres://db/other");
        assert_eq!(config.server.port, 6000);
        assert_eq!(config.server.startup, StartupPolicy::Degraded);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    fn repo_config() -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_CONFIG_PATH)
    }

    fn names(config: &HubConfig) -> Vec<&str> {
        config.resources.iter().map(|r| r.name.as_str()).collect()
    }

    #[tokio::test]
    async fn falls_back_to_default_file() {
        let config = load_source(None, &repo_config()).await.unwrap();
        assert_eq!(names(&config), vec!["teas", "biscuits", "games"]);
        assert_eq!(config.resources[2].backend, BackendKind::Postgres);
        validate(&config).unwrap();
    }

    #[tokio::test]
    async fn falls_back_to_sample_without_file() {
        let missing = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/does_not_exist.json");
        let config = load_source(None, &missing).await.unwrap();
        assert_eq!(names(&config), vec!["teas", "biscuits"]);
    }

    #[tokio::test]
    async fn explicit_path_wins() {
        let explicit = repo_config().display().to_string();
        let missing = Path::new("nowhere.json");
        let config = load_source(Some(explicit), missing).await.unwrap();
        assert!(names(&config).contains(&"games"));

        let err = load_source(Some("nowhere.json".into()), &repo_config()).await;
        assert!(matches!(err, Err(ConfigError::Load(_))));
    }

    #[test]
    fn bad_port_is_an_error() {
        let mut config = HubConfig::sample();
        let result = apply_env_overrides(&mut config, |k| (k == "HUB_PORT").then(|| "abc".to_string()));
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }
}
