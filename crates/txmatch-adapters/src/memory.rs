use crate::{Document, DocumentKind, Store, StoreError, decode, encode};
use std::collections::BTreeMap;
use std::sync::RwLock;
use txmatch_types::{TestRunId, Transaction};

#[derive(Debug, Clone)]
struct Entry {
    run_id: Option<String>,
    body: String,
}

/// Process-local store; contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: RwLock<BTreeMap<(DocumentKind, String), Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry<D: Document>(doc: &D) -> Result<Entry, StoreError> {
        Ok(Entry {
            run_id: doc.run_id().map(str::to_string),
            body: encode(doc)?,
        })
    }
}

impl Store for MemoryStore {
    fn insert<D: Document>(&self, doc: &D) -> Result<(), StoreError> {
        let entry = Self::entry(doc)?;
        let mut docs = self.docs.write().map_err(|_| StoreError::Poisoned)?;
        let key = (D::KIND, doc.id().to_string());
        if docs.contains_key(&key) {
            return Err(StoreError::Conflict {
                kind: D::KIND,
                id: key.1,
            });
        }
        docs.insert(key, entry);
        Ok(())
    }

    fn upsert<D: Document>(&self, doc: &D) -> Result<(), StoreError> {
        let entry = Self::entry(doc)?;
        let mut docs = self.docs.write().map_err(|_| StoreError::Poisoned)?;
        docs.insert((D::KIND, doc.id().to_string()), entry);
        Ok(())
    }

    fn get<D: Document>(&self, id: &str) -> Result<Option<D>, StoreError> {
        let docs = self.docs.read().map_err(|_| StoreError::Poisoned)?;
        docs.get(&(D::KIND, id.to_string()))
            .map(|e| decode(id, &e.body))
            .transpose()
    }

    fn list<D: Document>(&self) -> Result<Vec<D>, StoreError> {
        let docs = self.docs.read().map_err(|_| StoreError::Poisoned)?;
        docs.iter()
            .filter(|((kind, _), _)| *kind == D::KIND)
            .map(|((_, id), e)| decode(id, &e.body))
            .collect()
    }

    fn delete<D: Document>(&self, id: &str) -> Result<bool, StoreError> {
        let mut docs = self.docs.write().map_err(|_| StoreError::Poisoned)?;
        Ok(docs.remove(&(D::KIND, id.to_string())).is_some())
    }

    fn transactions_for_run(&self, run: &TestRunId) -> Result<Vec<Transaction>, StoreError> {
        let docs = self.docs.read().map_err(|_| StoreError::Poisoned)?;
        // BTreeMap iterates ids ascending; reverse for newest first.
        docs.iter()
            .rev()
            .filter(|((kind, _), e)| {
                *kind == DocumentKind::Transaction && e.run_id.as_deref() == Some(run.as_str())
            })
            .map(|((_, id), e)| decode(id, &e.body))
            .collect()
    }
}
