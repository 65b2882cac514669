//! Session records and permission sets.
//!
//! A [`Session`] is a time-bounded, revocable grant of permissions tied
//! to one authenticated identity. Records are plain data: all lifecycle
//! rules (TTL, lazy expiry, terminal deactivation) are enforced by the
//! session store that owns them.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{PublicId, SessionId, Timestamp};

// ---------------------------------------------------------------------------
// Permission
// ---------------------------------------------------------------------------

/// Capability tag carried by a session.
///
/// Closed set: the UI layer maps features onto these tags and nothing
/// else. Ordered so permission sets serialize deterministically.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Execute swaps.
    Trade,
    /// Stake and unstake.
    Stake,
    /// Read-only portfolio access.
    ViewPortfolio,
}

impl Permission {
    /// The default permission set granted on authentication.
    pub fn default_set() -> BTreeSet<Permission> {
        [Permission::Trade, Permission::Stake, Permission::ViewPortfolio]
            .into_iter()
            .collect()
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trade => write!(f, "trade"),
            Self::Stake => write!(f, "stake"),
            Self::ViewPortfolio => write!(f, "view_portfolio"),
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A single authenticated session.
///
/// # Invariants
///
/// - `expires_at > created_at`.
/// - Once `active` is `false` the session is terminal; it is never
///   reactivated, and the store removes its persisted record.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unguessable random identifier.
    pub session_id: SessionId,
    /// Public id of the owning identity.
    pub public_id: PublicId,
    /// Creation time (UTC).
    pub created_at: Timestamp,
    /// Expiry time (UTC). Strictly after `created_at`.
    pub expires_at: Timestamp,
    /// `false` once logged out or lazily expired. Terminal.
    pub active: bool,
    /// Capability tags granted to this session.
    pub permissions: BTreeSet<Permission>,
}

impl Session {
    /// Returns `true` if this session's TTL has elapsed at `now`.
    pub fn is_expired_at(&self, now: &Timestamp) -> bool {
        *now > self.expires_at
    }
}

// ---------------------------------------------------------------------------
// SessionStats
// ---------------------------------------------------------------------------

/// Snapshot statistics over the in-memory session table.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Number of live (active, unexpired) sessions.
    pub active_count: usize,
    /// Total number of sessions currently tracked in memory.
    pub total_count: usize,
    /// Mean age in milliseconds of the live sessions, `0.0` when none.
    pub average_active_duration_ms: f64,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
