//! Resource registry: every configured resource, its backend, and whether startup
//! managed to give it a working collection.

use crate::collection::{seed_documents, MemoryCollection, PgCollection, SharedCollection};
use crate::config::{BackendKind, HubConfig, ResourceConfig, StartupPolicy};
use crate::error::AppError;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResourceStatus {
    Available,
    /// Startup failed for this resource; the reason is reported by `/ready`.
    Unavailable(String),
}

#[derive(Clone)]
pub struct ResourceEntry {
    pub name: String,
    pub backend: BackendKind,
    pub status: ResourceStatus,
    /// Present exactly when status is `Available`.
    pub collection: Option<SharedCollection>,
}

/// Registry in config order. Built once at startup, then shared read-only behind an `Arc`.
#[derive(Clone, Default)]
pub struct ResourceRegistry {
    entries: Vec<ResourceEntry>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        ResourceRegistry { entries: Vec::new() }
    }

    pub fn register(&mut self, name: impl Into<String>, backend: BackendKind, collection: SharedCollection) {
        self.entries.push(ResourceEntry {
            name: name.into(),
            backend,
            status: ResourceStatus::Available,
            collection: Some(collection),
        });
    }

    pub fn register_unavailable(&mut self, name: impl Into<String>, backend: BackendKind, reason: impl Into<String>) {
        self.entries.push(ResourceEntry {
            name: name.into(),
            backend,
            status: ResourceStatus::Unavailable(reason.into()),
            collection: None,
        });
    }

    pub fn get(&self, name: &str) -> Option<&ResourceEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn entries(&self) -> &[ResourceEntry] {
        &self.entries
    }

    pub fn all_available(&self) -> bool {
        self.entries.iter().all(|e| e.status == ResourceStatus::Available)
    }
}

async fn open_postgres(pool: &PgPool, schema: &str, resource: &ResourceConfig) -> Result<SharedCollection, AppError> {
    let collection = PgCollection::open(pool.clone(), schema, &resource.name).await?;
    let seeded = collection.seed_if_empty(seed_documents(&resource.seed)).await?;
    if seeded > 0 {
        tracing::info!(resource = %resource.name, count = seeded, "seeded collection");
    }
    Ok(Arc::new(collection))
}

/// Build a collection for every configured resource. `pool` is `None` when the
/// document store could not be reached (or no resource needs it).
/// Under `FailFast` any postgres failure is returned; under `Degraded` the
/// resource is registered as unavailable and startup continues.
pub async fn build_registry(config: &HubConfig, pool: Option<&PgPool>) -> Result<ResourceRegistry, AppError> {
    let policy = config.server.startup;
    let mut registry = ResourceRegistry::new();

    for resource in &config.resources {
        let opened = match resource.backend {
            BackendKind::Memory => {
                let collection = MemoryCollection::seeded(seed_documents(&resource.seed));
                Ok(Arc::new(collection) as SharedCollection)
            }
            BackendKind::Postgres => match pool {
                Some(pool) => open_postgres(pool, &config.store.schema, resource).await,
                None => Err(AppError::Unavailable("document store not connected".into())),
            },
        };

        match opened {
            Ok(collection) => registry.register(resource.name.clone(), resource.backend, collection),
            Err(e) if policy == StartupPolicy::Degraded => {
                tracing::warn!(resource = %resource.name, error = %e, "resource unavailable, continuing degraded");
                registry.register_unavailable(resource.name.clone(), resource.backend, e.to_string());
            }
            Err(e) => {
                tracing::error!(resource = %resource.name, error = %e, "resource setup failed");
                return Err(e);
            }
        }
    }

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResourceConfig;

    #[tokio::test]
    async fn memory_resources_are_seeded() {
        let registry = build_registry(&HubConfig::sample(), None).await.unwrap();
        assert!(registry.all_available());
        let teas = registry.get("teas").unwrap();
        let items = teas.collection.as_ref().unwrap().find_all().await.unwrap();
        assert_eq!(items.len(), 5);
        assert_eq!(items[0]["name"], "Early Grey");
        assert!(registry.get("biscuits").is_some());
        assert!(registry.get("games").is_none());
    }

    #[tokio::test]
    async fn missing_store_fails_fast() {
        let mut config = HubConfig::sample();
        config.resources.push(ResourceConfig::postgres("games"));
        let result = build_registry(&config, None).await;
        assert!(matches!(result, Err(AppError::Unavailable(_))));
    }

    #[tokio::test]
    async fn missing_store_degrades() {
        let mut config = HubConfig::sample();
        config.server.startup = StartupPolicy::Degraded;
        config.resources.push(ResourceConfig::postgres("games"));
        let registry = build_registry(&config, None).await.unwrap();

        assert!(!registry.all_available());
        let games = registry.get("games").unwrap();
        assert!(games.collection.is_none());
        assert!(matches!(&games.status, ResourceStatus::Unavailable(reason) if reason.contains("not connected")));
        assert_eq!(registry.get("teas").unwrap().status, ResourceStatus::Available);
    }
}
