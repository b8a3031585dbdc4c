//! In-memory storage adapter.
//!
//! Implements [`StoragePort`] over a process-local map. Used by the host
//! simulation and unit tests; a device build substitutes its durable
//! key-value store behind the same trait. Write atomicity is trivial
//! here — each insert replaces the whole value.

use std::collections::HashMap;

use crate::app::ports::{StorageError, StoragePort};

/// Process-local key-value store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn qualify(namespace: &str, key: &str) -> String {
        format!("{namespace}::{key}")
    }
}

impl StoragePort for MemoryStore {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        match self.entries.get(&Self::qualify(namespace, key)) {
            Some(value) => {
                let n = value.len().min(buf.len());
                buf[..n].copy_from_slice(&value[..n]);
                Ok(n)
            }
            None => Err(StorageError::NotFound),
        }
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        self.entries
            .insert(Self::qualify(namespace, key), data.to_vec());
        Ok(())
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        self.entries.remove(&Self::qualify(namespace, key));
        Ok(())
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.entries.contains_key(&Self::qualify(namespace, key))
    }
}
