//! In-process store

use std::sync::Mutex;

use super::{Entries, KeyValueStore, StorageError};

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<Entries>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: Mutex::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn snapshot(&self) -> Result<Entries, StorageError> {
        Ok(self
            .entries
            .lock()
            .map_err(|_| StorageError::Poisoned)?
            .clone())
    }

    fn update(&self, apply: &mut dyn FnMut(&mut Entries)) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        apply(&mut entries);
        Ok(())
    }
}
