//! Raw config types matching the JSON config file.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct HubConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub resources: Vec<ResourceConfig>,
}

/// What to do when a resource's backing store cannot be set up at startup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartupPolicy {
    /// Abort startup.
    #[default]
    FailFast,
    /// Keep serving; the resource answers 503 and `/ready` reports it.
    Degraded,
}

impl std::str::FromStr for StartupPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fail_fast" | "fail-fast" => Ok(StartupPolicy::FailFast),
            "degraded" => Ok(StartupPolicy::Degraded),
            _ => Err(format!("invalid startup policy: {} (expected fail_fast or degraded)", s)),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Prefix every resource is mounted under, e.g. `/api` gives `/api/teas`.
    pub api_prefix: String,
    pub body_limit_bytes: usize,
    pub startup: StartupPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".into(),
            port: 5000,
            api_prefix: "/api".into(),
            body_limit_bytes: 1024 * 1024,
            startup: StartupPolicy::FailFast,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub database_url: String,
    /// PostgreSQL schema holding one table per postgres-backed resource.
    pub schema: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            database_url: "postgres://localhost/games_hub".into(),
            schema: "hub".into(),
            max_connections: 5,
            acquire_timeout_secs: 5,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    #[default]
    Memory,
    Postgres,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Memory => "memory",
            BackendKind::Postgres => "postgres",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Used both as the URL segment and, for postgres, as the table name.
    pub name: String,
    #[serde(default)]
    pub backend: BackendKind,
    /// Items loaded into an empty collection at startup.
    #[serde(default)]
    pub seed: Vec<Value>,
}

impl ResourceConfig {
    pub fn memory(name: impl Into<String>) -> Self {
        ResourceConfig {
            name: name.into(),
            backend: BackendKind::Memory,
            seed: Vec::new(),
        }
    }

    pub fn postgres(name: impl Into<String>) -> Self {
        ResourceConfig {
            backend: BackendKind::Postgres,
            ..ResourceConfig::memory(name)
        }
    }

    pub fn with_seed(mut self, seed: Vec<Value>) -> Self {
        self.seed = seed;
        self
    }
}

/// The five teas the in-memory sample starts with.
pub fn sample_teas() -> Vec<Value> {
    vec![
        json!({ "name": "Early Grey", "brand": "Twinings" }),
        json!({ "name": "Irish Breakfast", "brand": "Barry's Tea" }),
        json!({ "name": "Lemon and Ginger", "brand": "Lipton" }),
        json!({ "name": "Rooibos", "brand": "Tick Tock" }),
        json!({ "name": "Green", "brand": "Clipper" }),
    ]
}

impl HubConfig {
    /// Built-in config used when no file is given: seeded `teas` and empty `biscuits`, both in memory.
    pub fn sample() -> Self {
        HubConfig {
            server: ServerConfig::default(),
            store: StoreConfig::default(),
            resources: vec![
                ResourceConfig::memory("teas").with_seed(sample_teas()),
                ResourceConfig::memory("biscuits"),
            ],
        }
    }

    pub fn uses_postgres(&self) -> bool {
        self.resources.iter().any(|r| r.backend == BackendKind::Postgres)
    }
}
