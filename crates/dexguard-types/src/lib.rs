//! Core shared types for the dexguard credential and session core.
//!
//! This crate defines all fundamental types used across the workspace:
//! identifiers, timestamps, session records, the central error enum, and
//! the two capability traits the core consumes. No other crate should
//! define shared types — everything lives here.

pub mod session;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// PublicId
// ---------------------------------------------------------------------------

/// Public identifier of an identity: `SHA3-256` of its Ed25519 public key.
///
/// Sessions created for an external ledger address carry a public id
/// hashed from the address bytes instead, so the raw address never has
/// to appear in persisted session records.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct PublicId([u8; 32]);

impl PublicId {
    /// The fixed byte length of a public id.
    pub const LEN: usize = 32;

    /// Creates a `PublicId` from raw bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for PublicId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for PublicId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for PublicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for PublicId {
    type Err = DexguardError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|_| DexguardError::Config {
            reason: "invalid hex encoding for public id".into(),
        })?;
        if bytes.len() != 32 {
            return Err(DexguardError::Config {
                reason: format!("expected 32 bytes for public id, got {}", bytes.len()),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

// ---------------------------------------------------------------------------
// SessionId
// ---------------------------------------------------------------------------

/// Unguessable session identifier: 32 bytes drawn from a secure random
/// source at creation time.
///
/// Never derived from the owning identity or from the clock alone.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SessionId([u8; 32]);

impl SessionId {
    /// The fixed byte length of a session id.
    pub const LEN: usize = 32;

    /// Creates a `SessionId` from raw bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for SessionId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for SessionId {
    type Err = DexguardError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|_| DexguardError::SessionNotFound {
            reason: "invalid hex encoding for session id".into(),
        })?;
        if bytes.len() != 32 {
            return Err(DexguardError::SessionNotFound {
                reason: format!("expected 32 bytes for session id, got {}", bytes.len()),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

// ---------------------------------------------------------------------------
// LedgerAddress
// ---------------------------------------------------------------------------

/// Opaque ledger address.
///
/// The core never interprets address bytes; format validation is the
/// ledger connector's job. Kept as a newtype so an address cannot be
/// confused with other strings at API boundaries.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct LedgerAddress(String);

impl LedgerAddress {
    /// Wraps a raw address string.
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    /// Returns the address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LedgerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for LedgerAddress {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Timestamp
// ---------------------------------------------------------------------------

/// UTC timestamp in ISO 8601 / RFC 3339 form.
///
/// All timestamps in dexguard use UTC so that expiry comparisons are
/// deterministic regardless of host timezone.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a `Timestamp` representing the current UTC time.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a `Timestamp` from a `DateTime<Utc>`.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Returns this timestamp shifted forward by `duration`.
    pub fn plus(&self, duration: chrono::Duration) -> Self {
        Self(self.0 + duration)
    }

    /// Milliseconds elapsed from `self` to `later` (negative if `later`
    /// precedes `self`).
    pub fn millis_until(&self, later: &Timestamp) -> i64 {
        (later.0 - self.0).num_milliseconds()
    }

    /// Returns the timestamp as an RFC 3339 string.
    pub fn as_str(&self) -> String {
        self.0.to_rfc3339()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl FromStr for Timestamp {
    type Err = DexguardError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let dt = DateTime::parse_from_rfc3339(s)
            .map_err(|e| DexguardError::Config {
                reason: format!("invalid RFC 3339 timestamp: {e}"),
            })?
            .with_timezone(&Utc);
        Ok(Self(dt))
    }
}

// ---------------------------------------------------------------------------
// DexguardError
// ---------------------------------------------------------------------------

/// Central error type for the dexguard core.
///
/// All crates in the workspace convert their internal errors into
/// variants of this enum. Cryptographic and validation failures are
/// surfaced synchronously and are never silently swallowed or retried
/// inside the core.
#[derive(Debug, Error)]
pub enum DexguardError {
    /// The ledger address is malformed or rejected by the connector.
    #[error("invalid address: {reason}")]
    InvalidAddress {
        /// Human-readable description of why the address is invalid.
        reason: String,
    },

    /// A supplied signature does not verify against its message.
    #[error("signature verification failed: {reason}")]
    SignatureVerification {
        /// Human-readable description of the verification failure.
        reason: String,
    },

    /// No session exists under the given id.
    #[error("session not found: {reason}")]
    SessionNotFound {
        /// Human-readable description of the lookup failure.
        reason: String,
    },

    /// The session existed but its TTL has elapsed.
    #[error("session expired: {reason}")]
    SessionExpired {
        /// Human-readable description including the expiry time.
        reason: String,
    },

    /// Encrypting secret material failed.
    #[error("encryption failed: {reason}")]
    Encryption {
        /// Human-readable description of the encryption failure.
        reason: String,
    },

    /// Decrypting secret material failed (wrong passphrase or corrupted
    /// data — the authentication tag did not verify).
    #[error("decryption failed: {reason}")]
    Decryption {
        /// Human-readable description of the decryption failure.
        reason: String,
    },

    /// A recovery phrase is malformed: wrong word count, unknown word,
    /// or checksum mismatch.
    #[error("invalid recovery phrase: {reason}")]
    RecoveryPhraseInvalid {
        /// Human-readable description of the phrase defect.
        reason: String,
    },

    /// Generating a new wallet failed (entropy or key derivation).
    #[error("wallet generation failed: {reason}")]
    WalletGeneration {
        /// Human-readable description of the generation failure.
        reason: String,
    },

    /// The persistent store reported a failure.
    #[error("storage error: {reason}")]
    Storage {
        /// Human-readable description of the storage failure.
        reason: String,
    },

    /// A configuration value is invalid or missing.
    #[error("config error: {reason}")]
    Config {
        /// Human-readable description of the configuration problem.
        reason: String,
    },
}

/// Convenience result type using [`DexguardError`].
pub type Result<T> = std::result::Result<T, DexguardError>;

// ---------------------------------------------------------------------------
// LedgerConnector
// ---------------------------------------------------------------------------

/// External capability validating addresses and signatures against a
/// specific distributed ledger.
///
/// The core treats connector failures as the corresponding
/// [`DexguardError::InvalidAddress`] / [`DexguardError::SignatureVerification`]
/// errors. Retry policy belongs inside the connector implementation,
/// never in the core — by the time a call returns here it is terminal.
pub trait LedgerConnector: Send + Sync {
    /// Returns `true` if `address` is well-formed for the target ledger.
    fn is_valid_address(&self, address: &LedgerAddress) -> Result<bool>;

    /// Returns `true` if `signature` over `message` verifies for the key
    /// behind `address`.
    fn verify_signature(
        &self,
        address: &LedgerAddress,
        message: &[u8],
        signature: &[u8],
    ) -> Result<bool>;

    /// Returns the current balance of `address` in native units.
    fn get_balance(&self, address: &LedgerAddress) -> Result<f64>;
}

// ---------------------------------------------------------------------------
// KeyValueStore
// ---------------------------------------------------------------------------

/// Generic persistent key-value store behind which all durable state
/// lives.
///
/// Values are serialized records; keys are namespaced strings
/// (`session/<id>`, `account/<address>`). `list` exists so owners can
/// reload their namespace on construction; it returns keys only.
pub trait KeyValueStore: Send {
    /// Loads the value under `key`, or `None` if absent.
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Saves `value` under `key`, overwriting any previous value.
    fn save(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Deletes the value under `key`. Deleting an absent key is not an
    /// error.
    fn delete(&self, key: &str) -> Result<()>;

    /// Returns all keys starting with `prefix`.
    fn list(&self, prefix: &str) -> Result<Vec<String>>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
