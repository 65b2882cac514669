//! In-memory key-value store.

use std::collections::BTreeMap;
use std::sync::Mutex;

use dexguard_types::{DexguardError, KeyValueStore, Result};

/// Process-local [`KeyValueStore`] over a `BTreeMap`.
///
/// Contents vanish with the process. Intended for tests and for
/// embedders that explicitly opt out of durability; everything written
/// through it behaves exactly like the durable backend, including
/// prefix listing order.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, Vec<u8>>>> {
        self.entries.lock().map_err(|_| DexguardError::Storage {
            reason: "memory store mutex poisoned".into(),
        })
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn save(&self, key: &str, value: &[u8]) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .lock()?
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.clone())
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_load_delete() -> Result<()> {
        let store = MemoryStore::new();
        assert_eq!(store.load("k")?, None);

        store.save("k", b"v1")?;
        assert_eq!(store.load("k")?.as_deref(), Some(b"v1".as_slice()));

        store.save("k", b"v2")?;
        assert_eq!(store.load("k")?.as_deref(), Some(b"v2".as_slice()));

        store.delete("k")?;
        assert_eq!(store.load("k")?, None);
        Ok(())
    }

    #[test]
    fn delete_absent_key_is_ok() -> Result<()> {
        let store = MemoryStore::new();
        store.delete("missing")
    }

    #[test]
    fn list_respects_prefix() -> Result<()> {
        let store = MemoryStore::new();
        store.save("session/a", b"1")?;
        store.save("session/b", b"2")?;
        store.save("account/x", b"3")?;

        let keys = store.list("session/")?;
        assert_eq!(keys, vec!["session/a".to_string(), "session/b".to_string()]);

        assert_eq!(store.list("nothing/")?, Vec::<String>::new());
        Ok(())
    }
}
