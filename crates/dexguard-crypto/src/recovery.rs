//! Reversible 12-word recovery encoding of a 32-byte seed.
//!
//! A recovery phrase is the seed itself, not a fingerprint of it: the
//! 32 seed bytes plus a 4-byte SHA-256 checksum are split into twelve
//! 3-byte groups, and each group becomes one word from the fixed v1
//! [`wordlist`](crate::wordlist). Decoding is the exact inverse, so a
//! phrase written down on paper is sufficient to reconstruct the
//! identity offline — no passphrase involved; the passphrase only
//! re-wraps the recovered seed afterwards.
//!
//! # Encoding
//!
//! ```text
//! payload  = seed (32 bytes) || SHA-256(seed)[..4]
//! phrase   = payload split into 12 × 3-byte groups, one word each
//! ```
//!
//! Malformed phrases (wrong word count, a word outside the wordlist)
//! are rejected before the checksum hash is computed.

use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use dexguard_types::{DexguardError, Result};

use crate::wordlist::{bytes_to_word, word_to_bytes, BYTES_PER_WORD};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Fixed number of words in a recovery phrase.
pub const PHRASE_WORDS: usize = 12;

/// Checksum length appended to the seed before encoding.
const CHECKSUM_LEN: usize = 4;

/// Total payload bytes carried by a phrase: seed plus checksum.
const PAYLOAD_LEN: usize = Seed::LEN + CHECKSUM_LEN;

// ---------------------------------------------------------------------------
// Seed
// ---------------------------------------------------------------------------

/// A 32-byte identity seed.
///
/// The seed is the complete secret: the Ed25519 keypair is derived from
/// it deterministically. Zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Seed([u8; 32]);

impl Seed {
    /// Fixed byte length of a seed.
    pub const LEN: usize = 32;

    /// Creates a [`Seed`] from a raw 32-byte array.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Generates a fresh random seed from OS entropy.
    ///
    /// # Errors
    ///
    /// Returns [`DexguardError::WalletGeneration`] if the entropy source
    /// fails. This is the only failure mode.
    pub fn generate() -> Result<Self> {
        let mut bytes = [0u8; 32];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| DexguardError::WalletGeneration {
                reason: format!("entropy source failed: {e}"),
            })?;
        Ok(Self(bytes))
    }

    /// Returns the raw 32-byte seed.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

// Seed does not implement Clone/Debug to prevent leakage.

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encodes a seed as its 12-word recovery phrase.
///
/// Deterministic: the same seed yields the same phrase on every call
/// and across processes. Infallible — every 32-byte value has exactly
/// one phrase.
pub fn phrase_from_seed(seed: &Seed) -> Vec<String> {
    let checksum = Sha256::digest(seed.as_bytes());

    let mut payload = [0u8; PAYLOAD_LEN];
    payload[..Seed::LEN].copy_from_slice(seed.as_bytes());
    payload[Seed::LEN..].copy_from_slice(&checksum[..CHECKSUM_LEN]);

    let words = payload
        .chunks_exact(BYTES_PER_WORD)
        .map(|chunk| {
            let mut group = [0u8; BYTES_PER_WORD];
            group.copy_from_slice(chunk);
            bytes_to_word(&group)
        })
        .collect();

    payload.zeroize();
    words
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decodes a 12-word recovery phrase back to its seed.
///
/// Exact inverse of [`phrase_from_seed`] for any phrase it produced.
/// Words are matched case-insensitively with surrounding whitespace
/// ignored.
///
/// # Errors
///
/// Returns [`DexguardError::RecoveryPhraseInvalid`] if the phrase does
/// not have exactly 12 words, contains a word outside the v1 wordlist,
/// or fails the checksum. The word-count and wordlist checks run before
/// any hashing.
pub fn seed_from_phrase<S: AsRef<str>>(phrase: &[S]) -> Result<Seed> {
    if phrase.len() != PHRASE_WORDS {
        return Err(DexguardError::RecoveryPhraseInvalid {
            reason: format!("expected {PHRASE_WORDS} words, got {}", phrase.len()),
        });
    }

    let mut payload = [0u8; PAYLOAD_LEN];
    for (i, word) in phrase.iter().enumerate() {
        let normalized = word.as_ref().trim().to_ascii_lowercase();
        let group = word_to_bytes(&normalized).ok_or_else(|| {
            DexguardError::RecoveryPhraseInvalid {
                reason: format!("word {} ('{normalized}') is not in the recovery wordlist", i + 1),
            }
        })?;
        payload[i * BYTES_PER_WORD..(i + 1) * BYTES_PER_WORD].copy_from_slice(&group);
    }

    let mut seed_bytes = [0u8; Seed::LEN];
    seed_bytes.copy_from_slice(&payload[..Seed::LEN]);

    let expected = Sha256::digest(seed_bytes);
    let checksum_ok = payload[Seed::LEN..] == expected[..CHECKSUM_LEN];

    payload.zeroize();

    if !checksum_ok {
        seed_bytes.zeroize();
        return Err(DexguardError::RecoveryPhraseInvalid {
            reason: "checksum mismatch".into(),
        });
    }

    Ok(Seed::from_bytes(seed_bytes))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phrase_has_twelve_words() {
        let seed = Seed::from_bytes([0x42; 32]);
        assert_eq!(phrase_from_seed(&seed).len(), PHRASE_WORDS);
    }

    #[test]
    fn phrase_is_deterministic() {
        let seed_a = Seed::from_bytes([0x42; 32]);
        let seed_b = Seed::from_bytes([0x42; 32]);
        assert_eq!(phrase_from_seed(&seed_a), phrase_from_seed(&seed_b));
    }

    #[test]
    fn roundtrip_fixed_seeds() -> Result<()> {
        for fill in [0x00u8, 0x01, 0x7F, 0x80, 0xFF] {
            let seed = Seed::from_bytes([fill; 32]);
            let phrase = phrase_from_seed(&seed);
            let recovered = seed_from_phrase(&phrase)?;
            assert_eq!(recovered.as_bytes(), seed.as_bytes());
        }
        Ok(())
    }

    #[test]
    fn roundtrip_random_seeds() -> Result<()> {
        for _ in 0..16 {
            let seed = Seed::generate()?;
            let recovered = seed_from_phrase(&phrase_from_seed(&seed))?;
            assert_eq!(recovered.as_bytes(), seed.as_bytes());
        }
        Ok(())
    }

    #[test]
    fn decode_ignores_case_and_whitespace() -> Result<()> {
        let seed = Seed::from_bytes([0x13; 32]);
        let phrase: Vec<String> = phrase_from_seed(&seed)
            .into_iter()
            .map(|w| format!("  {}  ", w.to_ascii_uppercase()))
            .collect();
        let recovered = seed_from_phrase(&phrase)?;
        assert_eq!(recovered.as_bytes(), seed.as_bytes());
        Ok(())
    }

    #[test]
    fn wrong_word_count_rejected() {
        let seed = Seed::from_bytes([0x42; 32]);
        let mut phrase = phrase_from_seed(&seed);
        phrase.pop();
        let result = seed_from_phrase(&phrase);
        assert!(matches!(
            result,
            Err(DexguardError::RecoveryPhraseInvalid { .. })
        ));
    }

    #[test]
    fn eleven_copies_of_one_word_rejected() {
        let phrase = vec!["babbabbab"; 11];
        let result = seed_from_phrase(&phrase);
        assert!(matches!(
            result,
            Err(DexguardError::RecoveryPhraseInvalid { .. })
        ));
    }

    #[test]
    fn unknown_word_rejected() {
        let seed = Seed::from_bytes([0x42; 32]);
        let mut phrase = phrase_from_seed(&seed);
        phrase[5] = "notaword".into();
        let result = seed_from_phrase(&phrase);
        assert!(matches!(
            result,
            Err(DexguardError::RecoveryPhraseInvalid { .. })
        ));
    }

    #[test]
    fn corrupted_word_fails_checksum() {
        let seed = Seed::from_bytes([0x42; 32]);
        let mut phrase = phrase_from_seed(&seed);
        // Replace a word with a different valid word — the payload is
        // still decodable, so only the checksum can catch the swap.
        let replacement = if phrase[0] == "babbabbab" { "dabbabbab" } else { "babbabbab" };
        phrase[0] = replacement.into();
        let result = seed_from_phrase(&phrase);
        assert!(matches!(
            result,
            Err(DexguardError::RecoveryPhraseInvalid { .. })
        ));
    }

    #[test]
    fn distinct_seeds_give_distinct_phrases() {
        let a = phrase_from_seed(&Seed::from_bytes([0x01; 32]));
        let b = phrase_from_seed(&Seed::from_bytes([0x02; 32]));
        assert_ne!(a, b);
    }
}
