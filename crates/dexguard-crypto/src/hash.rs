//! SHA3-256 hashing helpers.
//!
//! Public ids for externally-supplied ledger addresses and the salted
//! one-way hashes protecting recovery-question answers both live here.

use rand::rngs::OsRng;
use rand::RngCore;
use sha3::{Digest, Sha3_256};

use dexguard_types::{DexguardError, LedgerAddress, PublicId, Result};

/// Byte length of a recovery-question salt.
pub const ANSWER_SALT_LEN: usize = 16;

/// Computes the SHA3-256 hash of arbitrary data.
pub fn sha3_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha3_256::new();
    hasher.update(data);
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

/// Derives the session-owner public id for an external ledger address.
///
/// `PublicId = SHA3-256(address bytes)` — deterministic, so repeated
/// authentications of the same address always map to the same owner,
/// and the raw address never needs to appear in session records.
pub fn public_id_for_address(address: &LedgerAddress) -> PublicId {
    PublicId::new(sha3_256(address.as_str().as_bytes()))
}

/// Generates a fresh random salt for a recovery-question answer.
///
/// # Errors
///
/// Returns [`DexguardError::WalletGeneration`] if the entropy source
/// fails.
pub fn generate_answer_salt() -> Result<[u8; ANSWER_SALT_LEN]> {
    let mut salt = [0u8; ANSWER_SALT_LEN];
    OsRng
        .try_fill_bytes(&mut salt)
        .map_err(|e| DexguardError::WalletGeneration {
            reason: format!("entropy source failed generating answer salt: {e}"),
        })?;
    Ok(salt)
}

/// One-way salted hash of a recovery-question answer.
///
/// Answers are normalized (trimmed, lowercased) before hashing so
/// capitalization at recovery time does not lock the user out.
/// `hash = SHA3-256(salt || normalized answer)`.
pub fn salted_answer_hash(salt: &[u8], answer: &str) -> [u8; 32] {
    let normalized = answer.trim().to_lowercase();
    let mut hasher = Sha3_256::new();
    hasher.update(salt);
    hasher.update(normalized.as_bytes());
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha3_is_deterministic() {
        assert_eq!(sha3_256(b"data"), sha3_256(b"data"));
        assert_ne!(sha3_256(b"data"), sha3_256(b"atad"));
    }

    #[test]
    fn address_public_id_is_stable() {
        let addr = LedgerAddress::from("addr1");
        assert_eq!(public_id_for_address(&addr), public_id_for_address(&addr));
        assert_ne!(
            public_id_for_address(&addr),
            public_id_for_address(&LedgerAddress::from("addr2"))
        );
    }

    #[test]
    fn answer_hash_normalizes_case_and_whitespace() {
        let salt = [0x07; ANSWER_SALT_LEN];
        assert_eq!(
            salted_answer_hash(&salt, "  Fluffy "),
            salted_answer_hash(&salt, "fluffy")
        );
    }

    #[test]
    fn answer_hash_depends_on_salt() {
        assert_ne!(
            salted_answer_hash(&[0x01; ANSWER_SALT_LEN], "fluffy"),
            salted_answer_hash(&[0x02; ANSWER_SALT_LEN], "fluffy")
        );
    }

    #[test]
    fn generated_salts_differ() -> Result<()> {
        assert_ne!(generate_answer_salt()?, generate_answer_salt()?);
        Ok(())
    }
}
