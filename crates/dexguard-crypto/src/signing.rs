//! Ed25519 keypair generation, signing, and verification.
//!
//! The private key is automatically zeroized on drop via
//! `ed25519-dalek`'s built-in `ZeroizeOnDrop`. A keypair is either
//! generated fresh from OS entropy or reconstructed deterministically
//! from a 32-byte [`Seed`](crate::recovery::Seed).

use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use sha3::{Digest, Sha3_256};

use dexguard_types::{DexguardError, PublicId, Result};

use crate::recovery::Seed;

// ---------------------------------------------------------------------------
// PublicKey
// ---------------------------------------------------------------------------

/// Ed25519 public key (32 bytes).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PublicKey([u8; 32]);

impl PublicKey {
    /// Fixed byte length of an Ed25519 public key.
    pub const LEN: usize = 32;

    /// Creates a [`PublicKey`] from raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the underlying 32-byte array.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// Ed25519 signature (64 bytes).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Signature([u8; 64]);

impl Signature {
    /// Fixed byte length of an Ed25519 signature.
    pub const LEN: usize = 64;

    /// Creates a [`Signature`] from raw bytes.
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Returns the underlying 64-byte array.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Keypair
// ---------------------------------------------------------------------------

/// Ed25519 signing keypair.
///
/// Wraps an `ed25519-dalek` [`SigningKey`]; the private half is
/// zeroized when this struct is dropped.
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generates a new random keypair using OS-level entropy.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self { signing_key }
    }

    /// Reconstructs a keypair deterministically from a seed.
    ///
    /// Given the same seed, this always produces the same keypair.
    pub fn from_seed(seed: &Seed) -> Self {
        let signing_key = SigningKey::from_bytes(seed.as_bytes());
        Self { signing_key }
    }

    /// Returns the public half of this keypair.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Returns this keypair's public id: `SHA3-256(public key)`.
    ///
    /// A pure function of the keypair — the same keypair always yields
    /// the same id.
    pub fn public_id(&self) -> PublicId {
        let mut hasher = Sha3_256::new();
        hasher.update(self.public_key().as_bytes());
        let digest = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);
        PublicId::new(out)
    }

    /// Signs an arbitrary message.
    ///
    /// Deterministic per RFC 8032: the same keypair and message always
    /// yield the same signature.
    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature(self.signing_key.sign(message).to_bytes())
    }

    /// Returns the 32-byte seed of this keypair.
    ///
    /// This is the complete secret material. Callers **must** zeroize
    /// or discard the copy as soon as it is no longer needed.
    pub fn seed_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }
}

// Keypair intentionally does not implement Clone or Debug to prevent
// accidental leakage of the private key in logs or copies.

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Returns `true` if `bytes` is a canonical Ed25519 public-key
/// encoding (a decodable curve point).
pub fn is_valid_public_key(bytes: &[u8; 32]) -> bool {
    VerifyingKey::from_bytes(bytes).is_ok()
}

/// Verifies an Ed25519 signature against a public key and message.
///
/// Uses strict verification (rejects malleable encodings).
///
/// # Errors
///
/// Returns [`DexguardError::SignatureVerification`] if the key is
/// invalid or the signature does not verify.
pub fn verify(public_key: &PublicKey, message: &[u8], signature: &[u8]) -> Result<()> {
    let vk = VerifyingKey::from_bytes(&public_key.0).map_err(|e| {
        DexguardError::SignatureVerification {
            reason: format!("invalid public key: {e}"),
        }
    })?;

    if signature.len() != Signature::LEN {
        return Err(DexguardError::SignatureVerification {
            reason: format!("expected {} signature bytes, got {}", Signature::LEN, signature.len()),
        });
    }
    let mut sig_bytes = [0u8; 64];
    sig_bytes.copy_from_slice(signature);
    let sig = ed25519_dalek::Signature::from_bytes(&sig_bytes);

    vk.verify_strict(message, &sig)
        .map_err(|e| DexguardError::SignatureVerification {
            reason: format!("signature does not verify: {e}"),
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
