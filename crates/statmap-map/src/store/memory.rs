use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::RwLock;

use serde_json::Value;
use statmap_model::{DataSetVersionId, DataSetVersionMapping};

use super::{
    FieldWrite, MappingStore, StoreError, StoreResult, apply_field_writes, from_document,
    to_document,
};
use crate::path::MappingPath;

/// In-memory store holding each record as a JSON document.
///
/// Partial writes patch the stored document in place, the same way a
/// document database applies a JSON patch.
#[derive(Debug, Default)]
pub struct MemoryMappingStore {
    documents: RwLock<BTreeMap<DataSetVersionId, Value>>,
}

impl MemoryMappingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw JSON of a whole record.
    pub fn document(&self, id: &DataSetVersionId) -> StoreResult<Option<Value>> {
        let documents = self.documents.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(documents.get(id).cloned())
    }

    pub fn len(&self) -> usize {
        self.documents.read().map(|d| d.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MappingStore for MemoryMappingStore {
    fn load(&self, id: &DataSetVersionId) -> StoreResult<Option<DataSetVersionMapping>> {
        match self.document(id)? {
            Some(document) => Ok(Some(from_document(document, id.as_str())?)),
            None => Ok(None),
        }
    }

    fn insert(&self, mapping: &DataSetVersionMapping) -> StoreResult<bool> {
        let document = to_document(mapping)?;
        let mut documents = self
            .documents
            .write()
            .map_err(|_| StoreError::LockPoisoned)?;
        match documents.entry(mapping.target_version_id.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(document);
                Ok(true)
            }
        }
    }

    fn delete(&self, id: &DataSetVersionId) -> StoreResult<bool> {
        let mut documents = self
            .documents
            .write()
            .map_err(|_| StoreError::LockPoisoned)?;
        Ok(documents.remove(id).is_some())
    }

    fn exists(&self, id: &DataSetVersionId) -> StoreResult<bool> {
        let documents = self.documents.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(documents.contains_key(id))
    }

    fn read_path(&self, id: &DataSetVersionId, path: &MappingPath) -> StoreResult<Option<Value>> {
        let documents = self.documents.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(documents
            .get(id)
            .and_then(|document| document.pointer(&path.pointer()))
            .cloned())
    }

    fn write_fields(
        &self,
        id: &DataSetVersionId,
        path: &MappingPath,
        writes: &[FieldWrite],
    ) -> StoreResult<()> {
        let mut documents = self
            .documents
            .write()
            .map_err(|_| StoreError::LockPoisoned)?;
        let document = documents
            .get_mut(id)
            .ok_or_else(|| StoreError::MissingRecord(id.clone()))?;
        apply_field_writes(document, id, path, writes)
    }
}
