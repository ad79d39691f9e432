// Document store adapter: named collections of JSON documents keyed by id
use anyhow::{anyhow, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::{fmt, str::FromStr, sync::Arc};
use uuid::Uuid;

use crate::config::{StoreBackend, StoreConfig};

mod memory;
mod sled_store;

pub use memory::MemoryStore;
pub use sled_store::SledStore;

pub const USERS: &str = "users";
pub const ORDERS: &str = "orders";

/// Field under which every stored document carries its identifier.
pub const ID_FIELD: &str = "_id";

pub type Document = Map<String, Value>;

/// Store-assigned document identifier (UUID v4, hyphenated on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(Uuid);

impl DocumentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

impl FromStr for DocumentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s.trim())?))
    }
}

/// Top-level field equality constraints, all of which must hold.
#[derive(Debug, Clone, Default)]
pub struct Filter(Vec<(String, Value)>);

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.push((field.into(), value.into()));
        self
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.0.iter().all(|(field, value)| doc.get(field) == Some(value))
    }
}

/// Per-collection document operations.
///
/// Calls are synchronous; implementations own whatever locking they need.
/// There is no multi-document atomicity.
pub trait DocumentStore: Send + Sync {
    /// Short backend name for health output.
    fn backend(&self) -> &'static str;

    fn find_all(&self, collection: &str) -> Result<Vec<Document>>;

    fn find_by_id(&self, collection: &str, id: &DocumentId) -> Result<Option<Document>>;

    /// Stores `doc` under a fresh identifier, overwriting any `_id` it carries.
    fn insert_one(&self, collection: &str, doc: Document) -> Result<DocumentId>;

    /// Sets every top-level field of `changes` on the matching document.
    /// Returns `false` when no document has this id.
    fn update_one(&self, collection: &str, id: &DocumentId, changes: Document) -> Result<bool>;

    /// Returns `false` when no document has this id.
    fn delete_one(&self, collection: &str, id: &DocumentId) -> Result<bool>;

    fn find_many(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>> {
        Ok(self
            .find_all(collection)?
            .into_iter()
            .filter(|doc| filter.matches(doc))
            .collect())
    }

    fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>> {
        Ok(self.find_many(collection, filter)?.into_iter().next())
    }

    fn count(&self, collection: &str) -> Result<usize> {
        Ok(self.find_all(collection)?.len())
    }
}

/// Open the store selected by configuration.
pub fn open(cfg: &StoreConfig) -> Result<Arc<dyn DocumentStore>> {
    let store: Arc<dyn DocumentStore> = match cfg.backend {
        StoreBackend::Sled => Arc::new(SledStore::open(&cfg.sled_path)?),
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
    };
    Ok(store)
}

/// Serialize a request model into a storable document.
pub fn to_document<T: Serialize>(value: &T) -> Result<Document> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(anyhow!("expected a JSON object, got {}", other)),
    }
}

fn with_id(mut doc: Document, id: &DocumentId) -> Document {
    doc.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
    doc
}

fn merge(target: &mut Document, changes: Document) {
    for (field, value) in changes {
        if field != ID_FIELD {
            target.insert(field, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test documents are objects"),
        }
    }

    #[test]
    fn document_id_parses_canonical_and_rejects_garbage() {
        let id = DocumentId::new();
        let parsed: DocumentId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);

        assert!("abc".parse::<DocumentId>().is_err());
        assert!("".parse::<DocumentId>().is_err());
        assert!("507f1f77bcf86cd799439011".parse::<DocumentId>().is_err());
    }

    #[test]
    fn filter_requires_every_field_to_match() {
        let d = doc(json!({"email": "ana@example.com", "rol": "admin"}));
        assert!(Filter::new().matches(&d));
        assert!(Filter::new().eq("email", "ana@example.com").matches(&d));
        assert!(!Filter::new()
            .eq("email", "ana@example.com")
            .eq("rol", "cliente")
            .matches(&d));
        assert!(!Filter::new().eq("missing", 1).matches(&d));
    }

    #[test]
    fn merge_sets_fields_but_keeps_identifier() {
        let mut target = doc(json!({"_id": "keep", "a": 1, "b": 2}));
        merge(&mut target, doc(json!({"_id": "other", "b": 3, "c": 4})));
        assert_eq!(Value::Object(target), json!({"_id": "keep", "a": 1, "b": 3, "c": 4}));
    }

    #[test]
    fn to_document_rejects_non_objects() {
        assert!(to_document(&json!({"x": 1})).is_ok());
        assert!(to_document(&json!([1, 2])).is_err());
    }
}
