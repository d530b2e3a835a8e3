use crate::error::{Error, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Document represents a retrievable unit of text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub content: String,
}

impl Document {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
        }
    }
}

/// Read access to a document collection.
///
/// `list` must return documents in a stable order; positional structures such as
/// the term-document matrix are indexed by that order.
pub trait DocumentStore: Send + Sync {
    fn list(&self) -> Result<Vec<Document>>;

    /// Fetch one document, failing with [`Error::NotFound`] when absent.
    fn get(&self, id: &str) -> Result<Document>;
}

/// Write access to a document collection.
pub trait DocumentSink {
    fn upsert(&self, doc: Document) -> Result<()>;

    /// Remove a document. Returns whether it existed.
    fn delete(&self, id: &str) -> Result<bool>;
}

/// Insertion-ordered in-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: RwLock<Vec<Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_documents(docs: Vec<Document>) -> Self {
        let store = Self::new();
        for doc in docs {
            store.put(doc);
        }
        store
    }

    fn put(&self, doc: Document) {
        let mut docs = self.docs.write();
        match docs.iter_mut().find(|d| d.id == doc.id) {
            Some(existing) => *existing = doc,
            None => docs.push(doc),
        }
    }

    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }
}

impl DocumentStore for MemoryStore {
    fn list(&self) -> Result<Vec<Document>> {
        Ok(self.docs.read().clone())
    }

    fn get(&self, id: &str) -> Result<Document> {
        self.docs
            .read()
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }
}

impl DocumentSink for MemoryStore {
    fn upsert(&self, doc: Document) -> Result<()> {
        self.put(doc);
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<bool> {
        let mut docs = self.docs.write();
        let before = docs.len();
        docs.retain(|d| d.id != id);
        Ok(docs.len() != before)
    }
}

/// Load every `.txt` file of a directory as a document.
///
/// The file name serves as both id and title. Files are sorted by name so the
/// resulting order does not depend on the directory listing.
pub fn load_text_dir<P: AsRef<Path>>(dir: P) -> std::io::Result<Vec<Document>> {
    let mut paths: Vec<_> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().map_or(false, |ext| ext == "txt"))
        .collect();
    paths.sort();

    let mut docs = Vec::with_capacity(paths.len());
    for path in paths {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content = fs::read_to_string(&path)?;
        docs.push(Document::new(name.clone(), name, content));
    }
    Ok(docs)
}

/// Parse a JSON array of documents
pub fn load_json(text: &str) -> serde_json::Result<Vec<Document>> {
    serde_json::from_str(text)
}
