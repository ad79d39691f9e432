// In-memory document store for tests and throwaway dev runs
use anyhow::{anyhow, Result};
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use super::{merge, with_id, Document, DocumentId, DocumentStore};

type Collection = BTreeMap<String, Document>;

#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> anyhow::Error {
    anyhow!("memory store lock poisoned")
}

impl DocumentStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    fn find_all(&self, collection: &str) -> Result<Vec<Document>> {
        let collections = self.collections.read().map_err(poisoned)?;
        Ok(collections
            .get(collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default())
    }

    fn find_by_id(&self, collection: &str, id: &DocumentId) -> Result<Option<Document>> {
        let collections = self.collections.read().map_err(poisoned)?;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(&id.to_string()))
            .cloned())
    }

    fn insert_one(&self, collection: &str, doc: Document) -> Result<DocumentId> {
        let id = DocumentId::new();
        let mut collections = self.collections.write().map_err(poisoned)?;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), with_id(doc, &id));
        Ok(id)
    }

    fn update_one(&self, collection: &str, id: &DocumentId, changes: Document) -> Result<bool> {
        let mut collections = self.collections.write().map_err(poisoned)?;
        match collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(&id.to_string()))
        {
            Some(existing) => {
                merge(existing, changes);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_one(&self, collection: &str, id: &DocumentId) -> Result<bool> {
        let mut collections = self.collections.write().map_err(poisoned)?;
        Ok(collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(&id.to_string()))
            .is_some())
    }

    fn count(&self, collection: &str) -> Result<usize> {
        let collections = self.collections.read().map_err(poisoned)?;
        Ok(collections.get(collection).map(|docs| docs.len()).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::conformance;

    #[test]
    fn memory_store_crud_cycle() {
        conformance::crud_cycle(&MemoryStore::new());
    }
}
