//! Resource hub: generic CRUD routers over pluggable document collections.

pub mod collection;
pub mod config;
pub mod error;
pub mod handlers;
pub mod registry;
pub mod routes;
pub mod server;
pub mod state;
pub mod store;

pub use collection::{Collection, Document, MemoryCollection, PgCollection, SharedCollection, ID_FIELD};
pub use config::{load, validate, BackendKind, HubConfig, ResourceConfig, StartupPolicy};
pub use error::{AppError, ConfigError};
pub use registry::{build_registry, ResourceRegistry, ResourceStatus};
pub use routes::{common_routes, resource_routes, unavailable_routes};
pub use server::{build_app, connect_store, run};
pub use state::{AppState, ResourceState};
