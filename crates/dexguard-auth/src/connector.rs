//! In-process Ed25519 ledger connector.
//!
//! Treats a ledger address as the hex encoding of a 32-byte Ed25519
//! public key and performs **real** strict signature verification —
//! a connector that waves signatures through is an authentication
//! bypass, not a stub. Balances are served from a local cache the
//! embedder refreshes from its market-data client; the core itself
//! never talks to the network.

use std::collections::HashMap;
use std::sync::Mutex;

use dexguard_crypto::signing::{is_valid_public_key, verify, PublicKey};
use dexguard_types::{DexguardError, LedgerAddress, LedgerConnector, Result};

// ---------------------------------------------------------------------------
// Ed25519Connector
// ---------------------------------------------------------------------------

/// [`LedgerConnector`] over raw Ed25519 keys.
#[derive(Default)]
pub struct Ed25519Connector {
    balances: Mutex<HashMap<String, f64>>,
}

impl Ed25519Connector {
    /// Creates a connector with an empty balance cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates the cached balance for `address`.
    ///
    /// Called by the embedder whenever its market-data client observes
    /// a new balance. Unknown addresses read as `0.0`, matching an
    /// empty on-ledger account.
    pub fn set_balance(&self, address: &LedgerAddress, balance: f64) -> Result<()> {
        self.lock()?.insert(address.as_str().to_string(), balance);
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, f64>>> {
        self.balances.lock().map_err(|_| DexguardError::Storage {
            reason: "balance cache mutex poisoned".into(),
        })
    }

    /// Decodes an address into its public key, or `None` if the
    /// address is not a canonical hex-encoded Ed25519 key.
    fn decode_address(address: &LedgerAddress) -> Option<PublicKey> {
        let bytes = hex::decode(address.as_str()).ok()?;
        let arr: [u8; 32] = bytes.try_into().ok()?;
        if !is_valid_public_key(&arr) {
            return None;
        }
        Some(PublicKey::from_bytes(arr))
    }
}

impl LedgerConnector for Ed25519Connector {
    fn is_valid_address(&self, address: &LedgerAddress) -> Result<bool> {
        Ok(Self::decode_address(address).is_some())
    }

    fn verify_signature(
        &self,
        address: &LedgerAddress,
        message: &[u8],
        signature: &[u8],
    ) -> Result<bool> {
        let Some(public_key) = Self::decode_address(address) else {
            return Err(DexguardError::InvalidAddress {
                reason: format!("'{address}' is not a hex-encoded Ed25519 public key"),
            });
        };
        Ok(verify(&public_key, message, signature).is_ok())
    }

    fn get_balance(&self, address: &LedgerAddress) -> Result<f64> {
        Ok(self.lock()?.get(address.as_str()).copied().unwrap_or(0.0))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
