//! Passphrase-based authenticated encryption for secret key material.
//!
//! Secrets at rest are sealed with XChaCha20-Poly1305 under a key
//! derived from the caller's passphrase via Argon2id. Every call draws
//! a **fresh random salt and nonce** from OS entropy; both are stored
//! in the resulting [`EncryptedSecret`] so nothing is ever reused
//! across encryptions. Decryption re-derives the key from the stored
//! salt and verifies the Poly1305 tag before returning a single byte
//! of plaintext — a wrong passphrase or corrupted record fails closed
//! with [`DexguardError::Decryption`].

use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use dexguard_types::{DexguardError, Result};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Additional authenticated data binding ciphertexts to the vault
/// record format. Decrypting the same bytes under a different AAD
/// (e.g. from another application) fails authentication.
const VAULT_AAD: &[u8] = b"dexguard-vault-v1";

/// Byte length of the per-record random salt.
const SALT_LEN: usize = 32;

/// Byte length of the XChaCha20-Poly1305 nonce.
const NONCE_LEN: usize = 24;

// ---------------------------------------------------------------------------
// Argon2Params
// ---------------------------------------------------------------------------

/// Argon2id tuning parameters, stored alongside each record so old
/// ciphertexts stay decryptable after the defaults change.
///
/// # Defaults
///
/// | Parameter | Default | Meaning |
/// |-----------|---------|---------|
/// | `m_cost`  | 65 536  | Memory usage in KiB (64 MiB) |
/// | `t_cost`  | 3       | Number of iterations |
/// | `p_cost`  | 1       | Degree of parallelism |
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Argon2Params {
    /// Memory cost in KiB. Must be ≥ 8 × `p_cost`.
    pub m_cost: u32,
    /// Time cost (number of passes). Must be ≥ 1.
    pub t_cost: u32,
    /// Parallelism degree. Must be ≥ 1.
    pub p_cost: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            m_cost: 65_536, // 64 MiB
            t_cost: 3,
            p_cost: 1,
        }
    }
}

// ---------------------------------------------------------------------------
// DerivedKey
// ---------------------------------------------------------------------------

/// 256-bit key derived by Argon2id. Zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
struct DerivedKey([u8; 32]);

// DerivedKey does not implement Clone/Debug to prevent leakage.

/// Derives the symmetric key from a passphrase and salt.
fn derive_key(passphrase: &str, salt: &[u8], params: &Argon2Params) -> Result<DerivedKey> {
    let argon2_params = argon2::Params::new(params.m_cost, params.t_cost, params.p_cost, Some(32))
        .map_err(|e| DexguardError::Config {
            reason: format!("invalid Argon2 parameters: {e}"),
        })?;

    let argon2 = argon2::Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        argon2_params,
    );

    let mut output = [0u8; 32];
    argon2
        .hash_password_into(passphrase.as_bytes(), salt, &mut output)
        .map_err(|e| DexguardError::Config {
            reason: format!("Argon2id derivation failed: {e}"),
        })?;

    Ok(DerivedKey(output))
}

// ---------------------------------------------------------------------------
// EncryptedSecret
// ---------------------------------------------------------------------------

/// An immutable sealed secret: ciphertext plus everything needed to
/// decrypt it again except the passphrase.
///
/// # Invariants
///
/// - `salt` and `nonce` are unique to this record; they are generated
///   fresh at encryption time and never reused.
/// - `ciphertext` carries the 16-byte Poly1305 tag appended; the tag
///   covers the ciphertext and the vault format AAD.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct EncryptedSecret {
    /// Encrypted payload with the authentication tag appended.
    pub ciphertext: Vec<u8>,
    /// 24-byte random nonce for this record.
    pub nonce: [u8; 24],
    /// 32-byte random Argon2id salt for this record.
    pub salt: [u8; 32],
    /// Key-derivation parameters used when this record was sealed.
    pub kdf: Argon2Params,
}

// ---------------------------------------------------------------------------
// Encrypt
// ---------------------------------------------------------------------------

/// Seals `secret` under `passphrase` with the default Argon2id cost.
///
/// # Errors
///
/// Returns [`DexguardError::Encryption`] only if the OS entropy source
/// fails (fatal), or if the cipher itself reports a failure.
pub fn encrypt_secret(secret: &[u8], passphrase: &str) -> Result<EncryptedSecret> {
    encrypt_secret_with_params(secret, passphrase, &Argon2Params::default())
}

/// Seals `secret` under `passphrase` with explicit Argon2id parameters.
///
/// Exists for embedders that tune KDF cost to their device class (and
/// for fast test fixtures).
pub fn encrypt_secret_with_params(
    secret: &[u8],
    passphrase: &str,
    params: &Argon2Params,
) -> Result<EncryptedSecret> {
    let mut salt = [0u8; SALT_LEN];
    OsRng
        .try_fill_bytes(&mut salt)
        .map_err(|e| DexguardError::Encryption {
            reason: format!("entropy source failed generating salt: {e}"),
        })?;

    let mut nonce = [0u8; NONCE_LEN];
    OsRng
        .try_fill_bytes(&mut nonce)
        .map_err(|e| DexguardError::Encryption {
            reason: format!("entropy source failed generating nonce: {e}"),
        })?;

    let key = derive_key(passphrase, &salt, params)?;

    let cipher = XChaCha20Poly1305::new(Key::from_slice(&key.0));
    let ciphertext = cipher
        .encrypt(
            XNonce::from_slice(&nonce),
            Payload {
                msg: secret,
                aad: VAULT_AAD,
            },
        )
        .map_err(|e| DexguardError::Encryption {
            reason: format!("XChaCha20-Poly1305 encryption failed: {e}"),
        })?;

    Ok(EncryptedSecret {
        ciphertext,
        nonce,
        salt,
        kdf: *params,
    })
}

// ---------------------------------------------------------------------------
// Decrypt
// ---------------------------------------------------------------------------

/// Opens a sealed record under `passphrase`.
///
/// The key is re-derived from the stored salt and parameters, and the
/// authentication tag is verified before any plaintext is released.
/// The plaintext is returned in a [`Zeroizing`] buffer so it is
/// scrubbed when the caller drops it.
///
/// # Errors
///
/// Returns [`DexguardError::Decryption`] if the tag does not verify —
/// wrong passphrase, corrupted record, or foreign AAD.
pub fn decrypt_secret(enc: &EncryptedSecret, passphrase: &str) -> Result<Zeroizing<Vec<u8>>> {
    let key = derive_key(passphrase, &enc.salt, &enc.kdf).map_err(|e| {
        DexguardError::Decryption {
            reason: format!("key derivation failed: {e}"),
        }
    })?;

    let cipher = XChaCha20Poly1305::new(Key::from_slice(&key.0));
    let plaintext = cipher
        .decrypt(
            XNonce::from_slice(&enc.nonce),
            Payload {
                msg: &enc.ciphertext,
                aad: VAULT_AAD,
            },
        )
        .map_err(|_| DexguardError::Decryption {
            reason: "authentication tag mismatch (wrong passphrase or corrupted data)".into(),
        })?;

    Ok(Zeroizing::new(plaintext))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Light parameters suitable for fast unit tests.
    fn test_params() -> Argon2Params {
        Argon2Params {
            m_cost: 256, // 256 KiB
            t_cost: 1,
            p_cost: 1,
        }
    }

    #[test]
    fn encrypt_decrypt_roundtrip() -> Result<()> {
        let secret = b"thirty-two bytes of key material";
        let enc = encrypt_secret_with_params(secret, "pw1", &test_params())?;
        let dec = decrypt_secret(&enc, "pw1")?;
        assert_eq!(dec.as_slice(), secret.as_slice());
        Ok(())
    }

    #[test]
    fn wrong_passphrase_fails_closed() -> Result<()> {
        let enc = encrypt_secret_with_params(b"secret", "pw1", &test_params())?;
        let result = decrypt_secret(&enc, "pw2");
        assert!(matches!(result, Err(DexguardError::Decryption { .. })));
        Ok(())
    }

    #[test]
    fn tampered_ciphertext_fails_closed() -> Result<()> {
        let mut enc = encrypt_secret_with_params(b"secret", "pw", &test_params())?;
        enc.ciphertext[0] ^= 0xFF;
        let result = decrypt_secret(&enc, "pw");
        assert!(matches!(result, Err(DexguardError::Decryption { .. })));
        Ok(())
    }

    #[test]
    fn tampered_salt_fails_closed() -> Result<()> {
        let mut enc = encrypt_secret_with_params(b"secret", "pw", &test_params())?;
        enc.salt[0] ^= 0xFF;
        let result = decrypt_secret(&enc, "pw");
        assert!(matches!(result, Err(DexguardError::Decryption { .. })));
        Ok(())
    }

    #[test]
    fn salt_and_nonce_fresh_per_call() -> Result<()> {
        let a = encrypt_secret_with_params(b"same secret", "same pw", &test_params())?;
        let b = encrypt_secret_with_params(b"same secret", "same pw", &test_params())?;
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.ciphertext, b.ciphertext);
        Ok(())
    }

    #[test]
    fn ciphertext_includes_tag_overhead() -> Result<()> {
        let enc = encrypt_secret_with_params(b"1234", "pw", &test_params())?;
        assert_eq!(enc.ciphertext.len(), 4 + 16);
        Ok(())
    }

    #[test]
    fn empty_secret_roundtrip() -> Result<()> {
        let enc = encrypt_secret_with_params(b"", "pw", &test_params())?;
        assert_eq!(enc.ciphertext.len(), 16); // tag only
        let dec = decrypt_secret(&enc, "pw")?;
        assert!(dec.is_empty());
        Ok(())
    }

    #[test]
    fn record_serde_roundtrip() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let enc = encrypt_secret_with_params(b"secret", "pw", &test_params())?;
        let json = serde_json::to_string(&enc)?;
        let parsed: EncryptedSecret = serde_json::from_str(&json)?;
        assert_eq!(enc, parsed);
        let dec = decrypt_secret(&parsed, "pw")?;
        assert_eq!(dec.as_slice(), b"secret");
        Ok(())
    }

    #[test]
    fn invalid_params_rejected() {
        let params = Argon2Params {
            t_cost: 0,
            ..test_params()
        };
        let result = encrypt_secret_with_params(b"secret", "pw", &params);
        assert!(result.is_err());
    }

    #[test]
    fn decrypt_with_default_params_record() -> Result<()> {
        // Default-cost derivation is slow but must stay compatible.
        let enc = encrypt_secret(b"secret", "pw")?;
        assert_eq!(enc.kdf, Argon2Params::default());
        let dec = decrypt_secret(&enc, "pw")?;
        assert_eq!(dec.as_slice(), b"secret");
        Ok(())
    }
}
