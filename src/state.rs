//! Shared state handed to routers.

use crate::collection::SharedCollection;
use crate::registry::ResourceRegistry;
use std::sync::Arc;

/// State of one mounted CRUD router: the collection it serves and nothing else.
#[derive(Clone)]
pub struct ResourceState {
    pub collection: SharedCollection,
}

/// State of the service-level routes (health, readiness).
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ResourceRegistry>,
}
