//! Config validation: resource names, uniqueness and seed shape.

use crate::config::HubConfig;
use crate::error::ConfigError;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z][a-z0-9_]*$").expect("static regex"))
}

/// Service routes mounted at the root; a root-mounted resource must not shadow them.
const RESERVED_AT_ROOT: &[&str] = &["health", "ready", "version", "info"];

pub fn is_valid_resource_name(name: &str) -> bool {
    name_pattern().is_match(name)
}

pub fn validate(config: &HubConfig) -> Result<(), ConfigError> {
    if config.resources.is_empty() {
        return Err(ConfigError::Validation("at least one resource required".into()));
    }

    let prefix = &config.server.api_prefix;
    if !prefix.starts_with('/') || (prefix.len() > 1 && prefix.ends_with('/')) {
        return Err(ConfigError::Validation(format!(
            "api_prefix must start with '/' and not end with '/': {}",
            prefix
        )));
    }
    if config.server.body_limit_bytes == 0 {
        return Err(ConfigError::Validation("body_limit_bytes must be positive".into()));
    }
    if config.uses_postgres() && !is_valid_resource_name(&config.store.schema) {
        return Err(ConfigError::Validation(format!("invalid store schema: {}", config.store.schema)));
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for r in &config.resources {
        if !is_valid_resource_name(&r.name) {
            return Err(ConfigError::InvalidName(r.name.clone()));
        }
        if prefix == "/" && RESERVED_AT_ROOT.contains(&r.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "resource '{}' collides with a service route; use a non-root api_prefix",
                r.name
            )));
        }
        if !seen.insert(r.name.as_str()) {
            return Err(ConfigError::DuplicatePathSegment(r.name.clone()));
        }
        if let Some(pos) = r.seed.iter().position(|v| !v.is_object()) {
            return Err(ConfigError::Validation(format!(
                "resource '{}': seed entry {} is not a JSON object",
                r.name, pos
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResourceConfig;
    use serde_json::json;

    #[test]
    fn sample_is_valid() {
        validate(&HubConfig::sample()).unwrap();
    }

    #[test]
    fn rejects_duplicates() {
        let mut config = HubConfig::sample();
        config.resources.push(ResourceConfig::postgres("teas"));
        assert!(matches!(
            validate(&config),
            Err(ConfigError::DuplicatePathSegment(name)) if name == "teas"
        ));
    }

    #[test]
    fn rejects_bad_names() {
        for bad in ["", "Teas", "1games", "games/old", "te as"] {
            let mut config = HubConfig::sample();
            config.resources = vec![ResourceConfig::memory(bad)];
            assert!(matches!(validate(&config), Err(ConfigError::InvalidName(_))), "{bad}");
        }
    }

    #[test]
    fn rejects_non_object_seed() {
        let mut config = HubConfig::sample();
        config.resources = vec![ResourceConfig::memory("teas").with_seed(vec![json!("Chai")])];
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn rejects_empty_and_bad_prefix() {
        let mut config = HubConfig::sample();
        config.resources.clear();
        assert!(validate(&config).is_err());

        let mut config = HubConfig::sample();
        config.server.api_prefix = "api/".into();
        assert!(validate(&config).is_err());

        let mut config = HubConfig::sample();
        config.server.api_prefix = "/".into();
        validate(&config).unwrap();
        config.resources.push(ResourceConfig::memory("health"));
        assert!(validate(&config).is_err());
    }
}
