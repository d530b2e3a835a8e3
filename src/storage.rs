use crate::document::{Document, DocumentSink, DocumentStore};
use crate::error::{Error, Result};
use sled::Db;
use std::path::Path;

const DOCS_TREE: &str = "documents";

/// Sled-backed document store.
///
/// Documents are listed in key order, which keeps the collection order stable
/// across process restarts.
pub struct SledStore {
    db: Db,
}

impl SledStore {
    /// Open or create a storage database
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// Create a temporary database (for testing)
    pub fn temporary() -> Result<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }

    /// Count stored documents
    pub fn count(&self) -> Result<usize> {
        let tree = self.db.open_tree(DOCS_TREE)?;
        Ok(tree.len())
    }

    /// Flush all changes to disk
    pub fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }
}

impl DocumentStore for SledStore {
    fn list(&self) -> Result<Vec<Document>> {
        let tree = self.db.open_tree(DOCS_TREE)?;
        let mut docs = Vec::new();

        for item in tree.iter() {
            let (_, value) = item?;
            let doc: Document = bincode::deserialize(&value)?;
            docs.push(doc);
        }

        Ok(docs)
    }

    fn get(&self, id: &str) -> Result<Document> {
        let tree = self.db.open_tree(DOCS_TREE)?;
        match tree.get(id.as_bytes())? {
            Some(data) => Ok(bincode::deserialize(&data)?),
            None => Err(Error::NotFound(id.to_string())),
        }
    }
}

impl DocumentSink for SledStore {
    fn upsert(&self, doc: Document) -> Result<()> {
        let tree = self.db.open_tree(DOCS_TREE)?;
        let serialized = bincode::serialize(&doc)?;
        tree.insert(doc.id.as_bytes(), serialized)?;
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<bool> {
        let tree = self.db.open_tree(DOCS_TREE)?;
        Ok(tree.remove(id.as_bytes())?.is_some())
    }
}
