//! Durable key-value store backed by sled.

use std::path::Path;

use dexguard_types::{DexguardError, KeyValueStore, Result};

/// Durable [`KeyValueStore`] over a sled database.
///
/// Writes are flushed to disk before `save`/`delete` return, so the
/// write-through guarantees of the stores built on top of this hold
/// across a crash: a record acknowledged as persisted is on disk.
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    /// Opens (or creates) a store at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DexguardError::Storage`] if the database cannot be
    /// opened (held lock, corrupted files, unwritable directory).
    pub fn open(path: &Path) -> Result<Self> {
        let db = sled::open(path).map_err(|e| DexguardError::Storage {
            reason: format!("failed to open sled database: {e}"),
        })?;
        Ok(Self { db })
    }

    fn flush(&self) -> Result<()> {
        self.db.flush().map_err(|e| DexguardError::Storage {
            reason: format!("failed to flush database: {e}"),
        })?;
        Ok(())
    }
}

impl KeyValueStore for SledStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let value = self.db.get(key).map_err(|e| DexguardError::Storage {
            reason: format!("failed to load '{key}': {e}"),
        })?;
        Ok(value.map(|ivec| ivec.to_vec()))
    }

    fn save(&self, key: &str, value: &[u8]) -> Result<()> {
        self.db
            .insert(key, value)
            .map_err(|e| DexguardError::Storage {
                reason: format!("failed to save '{key}': {e}"),
            })?;
        self.flush()
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.db.remove(key).map_err(|e| DexguardError::Storage {
            reason: format!("failed to delete '{key}': {e}"),
        })?;
        self.flush()
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in self.db.scan_prefix(prefix) {
            let (key, _) = entry.map_err(|e| DexguardError::Storage {
                reason: format!("failed to scan prefix '{prefix}': {e}"),
            })?;
            let key = String::from_utf8(key.to_vec()).map_err(|_| DexguardError::Storage {
                reason: "non-UTF-8 key in store".into(),
            })?;
            keys.push(key);
        }
        Ok(keys)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_load_delete_roundtrip() -> Result<()> {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SledStore::open(dir.path())?;

        store.save("k", b"value")?;
        assert_eq!(store.load("k")?.as_deref(), Some(b"value".as_slice()));

        store.delete("k")?;
        assert_eq!(store.load("k")?, None);
        Ok(())
    }

    #[test]
    fn values_survive_reopen() -> Result<()> {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let store = SledStore::open(dir.path())?;
            store.save("persist/me", b"still here")?;
        }
        let store = SledStore::open(dir.path())?;
        assert_eq!(
            store.load("persist/me")?.as_deref(),
            Some(b"still here".as_slice())
        );
        Ok(())
    }

    #[test]
    fn list_scans_prefix_only() -> Result<()> {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SledStore::open(dir.path())?;
        store.save("session/1", b"a")?;
        store.save("session/2", b"b")?;
        store.save("other/1", b"c")?;

        let mut keys = store.list("session/")?;
        keys.sort();
        assert_eq!(keys, vec!["session/1".to_string(), "session/2".to_string()]);
        Ok(())
    }
}
