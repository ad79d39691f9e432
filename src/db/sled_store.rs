// sled-backed document store: one tree per collection, JSON values keyed by id
use anyhow::Result;
use sled::{Db, Tree};
use std::sync::Arc;

use super::{merge, with_id, Document, DocumentId, DocumentStore};

#[derive(Clone)]
pub struct SledStore {
    db: Arc<Db>,
}

impl SledStore {
    pub fn open(path: &str) -> Result<Self> {
        let db = sled::open(path)?;
        tracing::debug!("opened sled store at {}", path);
        Ok(Self { db: Arc::new(db) })
    }

    /// Store that lives in a temp dir and is removed on drop.
    #[cfg(test)]
    pub fn temporary() -> Result<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db: Arc::new(db) })
    }

    fn tree(&self, collection: &str) -> Result<Tree> {
        Ok(self.db.open_tree(collection)?)
    }

    fn put(&self, tree: &Tree, id: &DocumentId, doc: &Document) -> Result<()> {
        tree.insert(id.to_string(), serde_json::to_vec(doc)?)?;
        self.db.flush()?;
        Ok(())
    }
}

impl DocumentStore for SledStore {
    fn backend(&self) -> &'static str {
        "sled"
    }

    fn find_all(&self, collection: &str) -> Result<Vec<Document>> {
        let tree = self.tree(collection)?;
        let mut docs = Vec::new();
        for entry in tree.iter() {
            let (_key, value) = entry?;
            docs.push(serde_json::from_slice(&value)?);
        }
        Ok(docs)
    }

    fn find_by_id(&self, collection: &str, id: &DocumentId) -> Result<Option<Document>> {
        let tree = self.tree(collection)?;
        match tree.get(id.to_string())? {
            Some(value) => Ok(Some(serde_json::from_slice(&value)?)),
            None => Ok(None),
        }
    }

    fn insert_one(&self, collection: &str, doc: Document) -> Result<DocumentId> {
        let tree = self.tree(collection)?;
        let id = DocumentId::new();
        self.put(&tree, &id, &with_id(doc, &id))?;
        Ok(id)
    }

    /// Compare-and-swap loop, so a concurrent delete is never written back.
    fn update_one(&self, collection: &str, id: &DocumentId, changes: Document) -> Result<bool> {
        let tree = self.tree(collection)?;
        let key = id.to_string();
        loop {
            let current = match tree.get(&key)? {
                Some(value) => value,
                None => return Ok(false),
            };
            let mut merged: Document = serde_json::from_slice(&current)?;
            merge(&mut merged, changes.clone());
            let swapped = tree.compare_and_swap(&key, Some(&current), Some(serde_json::to_vec(&merged)?))?;
            if swapped.is_ok() {
                self.db.flush()?;
                return Ok(true);
            }
            tracing::debug!(collection, id = %key, "document changed during update, retrying");
        }
    }

    fn delete_one(&self, collection: &str, id: &DocumentId) -> Result<bool> {
        let tree = self.tree(collection)?;
        let existed = tree.remove(id.to_string())?.is_some();
        self.db.flush()?;
        Ok(existed)
    }

    fn count(&self, collection: &str) -> Result<usize> {
        Ok(self.tree(collection)?.len())
    }
}
