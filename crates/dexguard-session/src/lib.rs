//! TTL-bounded session registry for the dexguard core.
//!
//! The [`SessionStore`](store::SessionStore) owns the mapping from
//! session id to session record, enforces expiry lazily at read time
//! (no background timers), and writes through to a persistent
//! key-value store so a crash cannot resurrect a logged-out session.

pub mod store;

pub use store::{SessionLookup, SessionStore};
