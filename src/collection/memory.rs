//! In-process collection backed by a vector. Order is insertion order; ids are
//! generated on insert and never derived from position.

use super::{id_of, new_id, stamp, Collection, Document};
use crate::error::AppError;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
pub struct MemoryCollection {
    items: RwLock<Vec<Value>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a collection holding `seed`, each entry stamped with a fresh id.
    pub fn seeded(seed: impl IntoIterator<Item = Document>) -> Self {
        let items = seed
            .into_iter()
            .map(|doc| Value::Object(stamp(doc, &new_id())))
            .collect();
        MemoryCollection {
            items: RwLock::new(items),
        }
    }

    pub fn len(&self) -> usize {
        self.items.read().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<Value>>, AppError> {
        self.items
            .read()
            .map_err(|_| AppError::Internal("collection lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<Value>>, AppError> {
        self.items
            .write()
            .map_err(|_| AppError::Internal("collection lock poisoned".into()))
    }
}

fn position(items: &[Value], id: &str) -> Option<usize> {
    items.iter().position(|item| id_of(item) == Some(id))
}

#[async_trait]
impl Collection for MemoryCollection {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn find_all(&self) -> Result<Vec<Value>, AppError> {
        Ok(self.read()?.clone())
    }

    async fn find_one(&self, id: &str) -> Result<Option<Value>, AppError> {
        let items = self.read()?;
        Ok(position(&items, id).map(|i| items[i].clone()))
    }

    async fn insert(&self, doc: Document) -> Result<Value, AppError> {
        let item = Value::Object(stamp(doc, &new_id()));
        self.write()?.push(item.clone());
        Ok(item)
    }

    async fn replace(&self, id: &str, doc: Document) -> Result<Option<Value>, AppError> {
        let mut items = self.write()?;
        let Some(i) = position(&items, id) else {
            return Ok(None);
        };
        items[i] = Value::Object(stamp(doc, id));
        Ok(Some(items[i].clone()))
    }

    async fn remove(&self, id: &str) -> Result<Option<Value>, AppError> {
        let mut items = self.write()?;
        Ok(position(&items, id).map(|i| items.remove(i)))
    }
}
