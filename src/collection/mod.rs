//! Collection adapters: the storage contract every mounted resource is built on.
//! The router only talks to `dyn Collection`, so in-memory and PostgreSQL-backed
//! resources share the same handlers.

pub mod memory;
pub mod postgres;

use crate::error::AppError;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

pub use memory::MemoryCollection;
pub use postgres::PgCollection;

/// Field holding the store-assigned identifier inside every item.
pub const ID_FIELD: &str = "_id";

/// An item body: any JSON object.
pub type Document = Map<String, Value>;

/// Handle shared by every in-flight request of one resource.
pub type SharedCollection = Arc<dyn Collection>;

#[async_trait]
pub trait Collection: Send + Sync {
    /// Short backend name reported by the readiness endpoint.
    fn backend(&self) -> &'static str;

    /// Every item, in insertion order.
    async fn find_all(&self) -> Result<Vec<Value>, AppError>;

    async fn find_one(&self, id: &str) -> Result<Option<Value>, AppError>;

    /// Stores the document under a freshly generated id and returns the stored item.
    async fn insert(&self, doc: Document) -> Result<Value, AppError>;

    /// Replaces the whole item. `None` when the id is unknown.
    async fn replace(&self, id: &str, doc: Document) -> Result<Option<Value>, AppError>;

    /// Removes the item and returns it. `None` when the id is unknown.
    async fn remove(&self, id: &str) -> Result<Option<Value>, AppError>;

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Writes `id` into the document's id field, overwriting any client-supplied value.
pub(crate) fn stamp(mut doc: Document, id: &str) -> Document {
    doc.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
    doc
}

pub(crate) fn id_of(item: &Value) -> Option<&str> {
    item.get(ID_FIELD).and_then(Value::as_str)
}

/// Seed entries must be objects; anything else is rejected during config validation.
pub(crate) fn seed_documents(seed: &[Value]) -> Vec<Document> {
    seed.iter()
        .filter_map(|v| v.as_object().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stamp_overwrites_client_id() {
        let doc = json!({ "_id": "mine", "name": "Chai" }).as_object().cloned().unwrap();
        let stamped = Value::Object(stamp(doc, "abc"));
        assert_eq!(id_of(&stamped), Some("abc"));
        assert_eq!(stamped["name"], "Chai");
    }

    #[test]
    fn generated_ids_are_uuids() {
        let id = new_id();
        assert!(uuid::Uuid::parse_str(&id).is_ok());
        assert_ne!(id, new_id());
    }
}
