//! Integration tests for the session store: persistence, reload, and
//! expiry behavior across store instances.
//!
//! Most expiry tests craft already-expired records and seed them into
//! the backing store, then observe them through a fresh `SessionStore`
//! — the same shape a crash-and-restart takes in production. Only the
//! read-time lazy-expiry test waits out a real sub-second TTL, because
//! that transition cannot be reached any other way.

use std::collections::BTreeSet;
use std::sync::Arc;

use dexguard_session::{SessionLookup, SessionStore};
use dexguard_storage::MemoryStore;
use dexguard_types::session::{Permission, Session};
use dexguard_types::{KeyValueStore, PublicId, Result, SessionId, Timestamp};

// ---------------------------------------------------------------------------
// Shared store handle
// ---------------------------------------------------------------------------

/// Lets two `SessionStore` instances (and the test itself) observe one
/// backing store, which is how reload-after-restart is exercised.
#[derive(Clone)]
struct SharedStore(Arc<MemoryStore>);

impl SharedStore {
    fn new() -> Self {
        Self(Arc::new(MemoryStore::new()))
    }
}

impl KeyValueStore for SharedStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.0.load(key)
    }
    fn save(&self, key: &str, value: &[u8]) -> Result<()> {
        self.0.save(key, value)
    }
    fn delete(&self, key: &str) -> Result<()> {
        self.0.delete(key)
    }
    fn list(&self, prefix: &str) -> Result<Vec<String>> {
        self.0.list(prefix)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn owner() -> PublicId {
    PublicId::new([0x22; 32])
}

fn permissions() -> BTreeSet<Permission> {
    Permission::default_set()
}

/// Builds a session whose expiry is `offset_ms` milliseconds from now
/// (negative = already expired) and seeds it into the backing store.
fn seed_session(store: &SharedStore, id_fill: u8, offset_ms: i64) -> Session {
    let created = Timestamp::now().plus(chrono::Duration::milliseconds(offset_ms - 60_000));
    let session = Session {
        session_id: SessionId::new([id_fill; 32]),
        public_id: owner(),
        created_at: created,
        expires_at: Timestamp::now().plus(chrono::Duration::milliseconds(offset_ms)),
        active: true,
        permissions: permissions(),
    };
    let bytes = serde_json::to_vec(&session).expect("serialize");
    store
        .save(&format!("session/{}", session.session_id), &bytes)
        .expect("seed save");
    session
}

// ---------------------------------------------------------------------------
// Write-through persistence
// ---------------------------------------------------------------------------

#[test]
fn create_writes_through_before_returning() -> Result<()> {
    let backing = SharedStore::new();
    let store = SessionStore::open(Box::new(backing.clone()))?;

    let session = store.create(owner(), chrono::Duration::hours(1), permissions())?;

    let key = format!("session/{}", session.session_id);
    let raw = backing.load(&key)?.expect("record persisted");
    let persisted: Session = serde_json::from_slice(&raw).expect("deserialize");
    assert_eq!(persisted, session);
    Ok(())
}

#[test]
fn deactivate_removes_persisted_record() -> Result<()> {
    let backing = SharedStore::new();
    let store = SessionStore::open(Box::new(backing.clone()))?;

    let session = store.create(owner(), chrono::Duration::hours(1), permissions())?;
    let key = format!("session/{}", session.session_id);
    assert!(backing.load(&key)?.is_some());

    assert!(store.deactivate(&session.session_id)?);
    assert!(backing.load(&key)?.is_none());
    Ok(())
}

// ---------------------------------------------------------------------------
// Reload on construction
// ---------------------------------------------------------------------------

#[test]
fn live_sessions_survive_reopen() -> Result<()> {
    let backing = SharedStore::new();
    let first = SessionStore::open(Box::new(backing.clone()))?;
    let session = first.create(owner(), chrono::Duration::hours(1), permissions())?;
    drop(first);

    let second = SessionStore::open(Box::new(backing))?;
    let fetched = second.get(&session.session_id)?;
    assert_eq!(fetched, Some(session));
    Ok(())
}

#[test]
fn logged_out_session_does_not_resurrect_on_reopen() -> Result<()> {
    let backing = SharedStore::new();
    let first = SessionStore::open(Box::new(backing.clone()))?;
    let session = first.create(owner(), chrono::Duration::hours(1), permissions())?;
    assert!(first.deactivate(&session.session_id)?);
    drop(first);

    let second = SessionStore::open(Box::new(backing))?;
    assert_eq!(second.get(&session.session_id)?, None);
    assert_eq!(second.stats()?.total_count, 0);
    Ok(())
}

#[test]
fn expired_records_are_purged_at_reopen() -> Result<()> {
    let backing = SharedStore::new();
    let expired = seed_session(&backing, 0xA1, -1);
    let live = seed_session(&backing, 0xA2, 3_600_000);

    let store = SessionStore::open(Box::new(backing.clone()))?;

    assert_eq!(store.get(&expired.session_id)?, None);
    assert!(store.get(&live.session_id)?.is_some());

    // The expired row is gone from the backing store, not just skipped.
    assert!(backing
        .load(&format!("session/{}", expired.session_id))?
        .is_none());

    let stats = store.stats()?;
    assert_eq!(stats.total_count, 1);
    assert_eq!(stats.active_count, 1);
    Ok(())
}

// ---------------------------------------------------------------------------
// Lazy expiry at read time
// ---------------------------------------------------------------------------

#[test]
fn session_live_just_before_ttl_none_just_after() -> Result<()> {
    let backing = SharedStore::new();

    // Expires comfortably in the future: still returned unchanged.
    let before = seed_session(&backing, 0xB1, 60_000);
    // Already past expiry when read.
    let after = seed_session(&backing, 0xB2, -60_000);

    let store = SessionStore::open(Box::new(backing.clone()))?;

    assert_eq!(store.get(&before.session_id)?, Some(before));
    assert_eq!(store.get(&after.session_id)?, None);
    Ok(())
}

#[test]
fn lazy_expiry_deactivates_and_deletes() -> Result<()> {
    let backing = SharedStore::new();

    // Seed a record that outlives open() by half a second, then let
    // it lapse while the store is running — the one case only
    // read-time expiry can catch.
    let lapsed = seed_session(&backing, 0xC3, 500);
    let store = SessionStore::open(Box::new(backing.clone()))?;
    assert!(store.get(&lapsed.session_id)?.is_some());

    std::thread::sleep(std::time::Duration::from_millis(700));

    match store.lookup(&lapsed.session_id)? {
        SessionLookup::Expired => {}
        other => panic!("expected Expired, got {other:?}"),
    }

    // Persisted row removed; stats no longer count it active.
    assert!(backing
        .load(&format!("session/{}", lapsed.session_id))?
        .is_none());
    let stats = store.stats()?;
    assert_eq!(stats.active_count, 0);

    // Terminal: deactivate after expiry reports false.
    assert!(!store.deactivate(&lapsed.session_id)?);
    Ok(())
}

#[test]
fn corrupt_record_fails_open() {
    let backing = SharedStore::new();
    backing
        .save("session/deadbeef", b"not a session record")
        .expect("seed save");

    let result = SessionStore::open(Box::new(backing));
    assert!(result.is_err());
}
