use crate::epub::document::{Document, DocumentKind};
use std::collections::HashMap;

/// Path-keyed document store. Iteration follows insertion order, which is
/// also the order entries are written back into the archive.
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    documents: Vec<Document>,
    index: HashMap<String, usize>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `doc` under `path`. A document already at `path` is replaced
    /// in place and returned.
    pub fn put(&mut self, path: &str, mut doc: Document) -> Option<Document> {
        doc.set_path(path);
        match self.index.get(path) {
            Some(&slot) => {
                tracing::warn!(path, "replacing existing document");
                Some(std::mem::replace(&mut self.documents[slot], doc))
            }
            None => {
                self.index.insert(path.to_string(), self.documents.len());
                self.documents.push(doc);
                None
            }
        }
    }

    pub fn get(&self, path: &str) -> Option<&Document> {
        self.index.get(path).map(|&slot| &self.documents[slot])
    }

    pub fn get_mut(&mut self, path: &str) -> Option<&mut Document> {
        let slot = *self.index.get(path)?;
        self.documents.get_mut(slot)
    }

    pub fn remove(&mut self, path: &str) -> Option<Document> {
        let slot = self.index.remove(path)?;
        let doc = self.documents.remove(slot);
        self.reindex_from(slot);
        Some(doc)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.documents.iter().map(Document::path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Document)> {
        self.documents.iter().map(|doc| (doc.path(), doc))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Document> {
        self.documents.iter_mut()
    }

    /// Documents of one kind, in store order.
    pub fn all_of_kind(&self, kind: DocumentKind) -> impl Iterator<Item = &Document> {
        self.documents.iter().filter(move |d| d.kind() == kind)
    }

    /// Move the document at `old` to `new`, keeping its position. Whatever
    /// already sat at `new` is dropped and returned.
    pub fn rekey(&mut self, old: &str, new: &str) -> Option<Document> {
        if old == new || !self.contains(old) {
            return None;
        }
        let displaced = self.remove(new);
        if displaced.is_some() {
            tracing::warn!(from = old, to = new, "rename overwrites an existing document");
        }
        let slot = self.index.remove(old)?;
        self.documents[slot].set_path(new);
        self.index.insert(new.to_string(), slot);
        displaced
    }

    /// Slots at or after `from` shifted left; point the index at them again.
    fn reindex_from(&mut self, from: usize) {
        for (slot, doc) in self.documents.iter().enumerate().skip(from) {
            self.index.insert(doc.path().to_string(), slot);
        }
    }
}
