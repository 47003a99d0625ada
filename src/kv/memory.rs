use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::KvError;

#[derive(Default)]
pub struct MemoryKv {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| KvError::LockError(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    pub fn put(&self, key: &str, value: String) -> Result<(), KvError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| KvError::LockError(e.to_string()))?;
        entries.insert(key.to_string(), value);
        Ok(())
    }
}
