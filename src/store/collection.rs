//! Collection Module
//!
//! In-memory collection of JSON documents with optional indexes.

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::store::{Document, ObjectId, ID_FIELD};

/// Collection shared between the query layer and its callers.
pub type SharedCollection = Arc<RwLock<Collection>>;

// == Index ==
/// Index declared on a collection field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Index {
    /// Full-text index used by title searches
    Text(String),
    /// Rejects documents repeating an existing value of the field
    Unique(String),
}

// == Collection ==
/// Ordered set of documents, each carrying an `_id` field.
#[derive(Debug, Default)]
pub struct Collection {
    name: String,
    documents: Vec<Document>,
    indexes: Vec<Index>,
}

impl Collection {
    // == Constructor ==
    /// Creates an empty collection.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documents: Vec::new(),
            indexes: Vec::new(),
        }
    }

    /// Wraps the collection for shared async access.
    pub fn into_shared(self) -> SharedCollection {
        Arc::new(RwLock::new(self))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Stored documents in insertion order.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn indexes(&self) -> &[Index] {
        &self.indexes
    }

    pub fn has_index(&self, index: &Index) -> bool {
        self.indexes.contains(index)
    }

    // == Ensure Index ==
    /// Declares an index; declaring the same index twice is a no-op.
    pub fn ensure_index(&mut self, index: Index) {
        if !self.has_index(&index) {
            debug!(collection = %self.name, ?index, "Creating index");
            self.indexes.push(index);
        }
    }

    // == Insert ==
    /// Stores a document and returns its id.
    ///
    /// A valid `_id` already present on the document is kept, otherwise a new
    /// one is generated. Fails if the id or a uniquely indexed field is
    /// already taken.
    pub fn insert(&mut self, mut document: Document) -> Result<ObjectId, StoreError> {
        let id = document
            .get(ID_FIELD)
            .and_then(Value::as_str)
            .and_then(ObjectId::parse)
            .unwrap_or_else(ObjectId::generate);
        document.insert(ID_FIELD.to_string(), Value::String(id.to_hex()));

        if self.find_by_id(&id).is_some() {
            return Err(self.duplicate(id.to_hex()));
        }

        for index in &self.indexes {
            if let Index::Unique(field) = index {
                if let Some(value) = document.get(field) {
                    if self.documents.iter().any(|doc| doc.get(field) == Some(value)) {
                        return Err(self.duplicate(display_value(value)));
                    }
                }
            }
        }

        self.documents.push(document);
        Ok(id)
    }

    /// Returns the stored document with the given id.
    pub fn find_by_id(&self, id: &ObjectId) -> Option<&Document> {
        let hex = id.to_hex();
        self.documents
            .iter()
            .find(|doc| doc.get(ID_FIELD).and_then(Value::as_str) == Some(hex.as_str()))
    }

    // == Load / Save ==
    /// Reads a collection from a JSON array of documents.
    pub async fn load(name: impl Into<String>, path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await?;
        let documents: Vec<Document> = serde_json::from_str(&raw)?;

        let mut collection = Self::new(name);
        for document in documents {
            collection.insert(document)?;
        }

        info!(
            "Loaded {} documents into '{}' from {}",
            collection.len(),
            collection.name,
            path.display()
        );
        Ok(collection)
    }

    /// Writes the documents as a pretty-printed JSON array.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let raw = serde_json::to_string_pretty(&self.documents)?;
        tokio::fs::write(path, raw).await?;
        Ok(())
    }

    fn duplicate(&self, key: String) -> StoreError {
        StoreError::DuplicateKey {
            collection: self.name.clone(),
            key,
        }
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
