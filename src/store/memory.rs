use std::collections::BTreeMap;
use std::sync::RwLock;

use serde_json::Value;

use super::KeyValueStore;
use crate::error::CollationError;

#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: RwLock<BTreeMap<String, Value>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize, CollationError> {
        let entries = self.entries.read().map_err(CollationError::store)?;
        Ok(entries.len())
    }

    pub fn is_empty(&self) -> Result<bool, CollationError> {
        Ok(self.len()? == 0)
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, CollationError> {
        let entries = self.entries.read().map_err(CollationError::store)?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: Value) -> Result<(), CollationError> {
        let mut entries = self.entries.write().map_err(CollationError::store)?;
        entries.insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool, CollationError> {
        let mut entries = self.entries.write().map_err(CollationError::store)?;
        Ok(entries.remove(key).is_some())
    }

    fn list_prefix(&self, prefix: &str) -> Result<Vec<(String, Value)>, CollationError> {
        let entries = self.entries.read().map_err(CollationError::store)?;
        Ok(entries
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }
}
