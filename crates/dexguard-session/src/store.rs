//! Session table with lazy expiry and write-through persistence.
//!
//! One mutex guards the in-memory map **and** the backing store, so
//! create/get/deactivate/stats execute as atomic units: two concurrent
//! `deactivate` calls on the same id can never both report success, and
//! storage can never disagree with memory in a way that resurrects a
//! terminated session.
//!
//! # Lifecycle
//!
//! A record enters the table active and leaves the *persisted* store on
//! its first terminal event — logout or lazy expiry at read time. The
//! in-memory record is kept with `active = false` as a tombstone until
//! the process ends, which is what keeps `stats()` totals meaningful
//! for the lifetime of the process.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use rand::rngs::OsRng;
use rand::RngCore;

use dexguard_types::session::{Permission, Session, SessionStats};
use dexguard_types::{
    DexguardError, KeyValueStore, PublicId, Result, SessionId, Timestamp,
};

/// Key namespace for persisted session records.
const KEY_PREFIX: &str = "session/";

// ---------------------------------------------------------------------------
// SessionLookup
// ---------------------------------------------------------------------------

/// Outcome of a session table probe.
///
/// [`SessionStore::get`] collapses this to `Option<Session>`; callers
/// that need to distinguish "never existed" from "outlived its TTL"
/// (to raise the right typed error) use
/// [`SessionStore::lookup`] directly.
#[derive(Debug)]
pub enum SessionLookup {
    /// The session is active and within its TTL.
    Live(Session),
    /// The session existed but its TTL elapsed; it has now been
    /// deactivated and its persisted record removed.
    Expired,
    /// No record under this id (or the record was already terminal).
    Missing,
}

// ---------------------------------------------------------------------------
// SessionStore
// ---------------------------------------------------------------------------

struct Inner {
    sessions: HashMap<SessionId, Session>,
    store: Box<dyn KeyValueStore>,
}

/// Owner of all session state for one process.
///
/// Constructed once via [`open`](Self::open); every read and write of
/// session state — in memory or persisted — goes through this type.
pub struct SessionStore {
    inner: Mutex<Inner>,
}

impl SessionStore {
    /// Opens the store, reloading previously persisted sessions.
    ///
    /// Non-expired records are loaded into memory; records whose TTL
    /// elapsed while the process was down are deleted from the backing
    /// store and not loaded.
    ///
    /// # Errors
    ///
    /// Returns [`DexguardError::Storage`] if the backing store fails or
    /// holds a record that does not deserialize.
    pub fn open(store: Box<dyn KeyValueStore>) -> Result<Self> {
        let mut sessions = HashMap::new();
        let now = Timestamp::now();

        for key in store.list(KEY_PREFIX)? {
            let Some(bytes) = store.load(&key)? else {
                continue;
            };
            let session: Session =
                serde_json::from_slice(&bytes).map_err(|e| DexguardError::Storage {
                    reason: format!("corrupt session record under '{key}': {e}"),
                })?;

            if session.is_expired_at(&now) || !session.active {
                store.delete(&key)?;
                continue;
            }
            sessions.insert(session.session_id, session);
        }

        Ok(Self {
            inner: Mutex::new(Inner { sessions, store }),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner.lock().map_err(|_| DexguardError::Storage {
            reason: "session store mutex poisoned".into(),
        })
    }

    // -- Operations -------------------------------------------------------

    /// Creates a new session for `public_id`.
    ///
    /// The session id is 32 bytes of OS entropy — never derived from
    /// the identity or the clock. The record is persisted before this
    /// method returns (write-through).
    ///
    /// # Errors
    ///
    /// - [`DexguardError::Config`] if `ttl` is not strictly positive.
    /// - [`DexguardError::Storage`] if the write-through fails; the
    ///   session is not registered in that case.
    pub fn create(
        &self,
        public_id: PublicId,
        ttl: chrono::Duration,
        permissions: std::collections::BTreeSet<Permission>,
    ) -> Result<Session> {
        if ttl <= chrono::Duration::zero() {
            return Err(DexguardError::Config {
                reason: format!("session ttl must be positive, got {ttl}"),
            });
        }

        let mut id_bytes = [0u8; 32];
        OsRng.fill_bytes(&mut id_bytes);
        let session_id = SessionId::new(id_bytes);

        let created_at = Timestamp::now();
        let session = Session {
            session_id,
            public_id,
            created_at,
            expires_at: created_at.plus(ttl),
            active: true,
            permissions,
        };

        let mut inner = self.lock()?;
        persist(inner.store.as_ref(), &session)?;
        inner.sessions.insert(session_id, session.clone());
        Ok(session)
    }

    /// Probes the table, applying lazy expiry.
    ///
    /// A record found past its `expires_at` is deactivated on the spot:
    /// `active` flips to `false`, the persisted record is deleted, and
    /// the probe reports [`SessionLookup::Expired`].
    pub fn lookup(&self, session_id: &SessionId) -> Result<SessionLookup> {
        let mut inner = self.lock()?;
        let now = Timestamp::now();

        let Some(session) = inner.sessions.get(session_id) else {
            return Ok(SessionLookup::Missing);
        };
        if !session.active {
            return Ok(SessionLookup::Missing);
        }
        if session.is_expired_at(&now) {
            expire_in_place(&mut inner, session_id)?;
            return Ok(SessionLookup::Expired);
        }
        Ok(SessionLookup::Live(session.clone()))
    }

    /// Returns the live session under `session_id`, or `None`.
    ///
    /// Missing, terminal, and lazily-expired records all collapse to
    /// `None`.
    pub fn get(&self, session_id: &SessionId) -> Result<Option<Session>> {
        Ok(match self.lookup(session_id)? {
            SessionLookup::Live(session) => Some(session),
            SessionLookup::Expired | SessionLookup::Missing => None,
        })
    }

    /// Deactivates the session under `session_id` (logout).
    ///
    /// Returns `true` exactly once per session: a second call, a call
    /// on an unknown id, or a call on an already-expired record all
    /// return `false`.
    pub fn deactivate(&self, session_id: &SessionId) -> Result<bool> {
        let mut inner = self.lock()?;
        let now = Timestamp::now();

        let Some(session) = inner.sessions.get(session_id) else {
            return Ok(false);
        };
        if !session.active {
            return Ok(false);
        }
        if session.is_expired_at(&now) {
            // Raced its own TTL: apply lazy expiry, but this call did
            // not deactivate a live session.
            expire_in_place(&mut inner, session_id)?;
            return Ok(false);
        }

        expire_in_place(&mut inner, session_id)?;
        Ok(true)
    }

    /// Computes statistics over the in-memory snapshot at call time.
    ///
    /// Live sessions are those active and within TTL; the average is
    /// their mean age in milliseconds (`0.0` when none are live).
    /// Terminal tombstones count toward `total_count` only.
    pub fn stats(&self) -> Result<SessionStats> {
        let inner = self.lock()?;
        let now = Timestamp::now();

        let total_count = inner.sessions.len();
        let mut active_count = 0usize;
        let mut age_sum_ms = 0i64;

        for session in inner.sessions.values() {
            if session.active && !session.is_expired_at(&now) {
                active_count += 1;
                age_sum_ms += session.created_at.millis_until(&now);
            }
        }

        let average_active_duration_ms = if active_count == 0 {
            0.0
        } else {
            age_sum_ms as f64 / active_count as f64
        };

        Ok(SessionStats {
            active_count,
            total_count,
            average_active_duration_ms,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn persist_key(session_id: &SessionId) -> String {
    format!("{KEY_PREFIX}{session_id}")
}

fn persist(store: &dyn KeyValueStore, session: &Session) -> Result<()> {
    let bytes = serde_json::to_vec(session).map_err(|e| DexguardError::Storage {
        reason: format!("failed to serialize session record: {e}"),
    })?;
    store.save(&persist_key(&session.session_id), &bytes)
}

/// Flips a record terminal and removes its persisted row. The caller
/// holds the lock and has already established the record exists.
fn expire_in_place(inner: &mut Inner, session_id: &SessionId) -> Result<()> {
    if let Some(session) = inner.sessions.get_mut(session_id) {
        session.active = false;
    }
    inner.store.delete(&persist_key(session_id))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
