//! Identity generation and recovery.
//!
//! An [`Identity`] is an Ed25519 keypair plus its derived public id.
//! Generation produces three artifacts in one call: the identity, the
//! seed sealed under a passphrase, and the [`RecoveryBundle`] (the
//! 12-word phrase, an independently sealed copy of the seed, and
//! salted recovery questions). The caller persists the sealed secret
//! and the bundle; the raw keypair lives only as long as the returned
//! [`Identity`] value.

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, Zeroizing};

use dexguard_crypto::hash::{generate_answer_salt, salted_answer_hash};
use dexguard_crypto::recovery::{phrase_from_seed, seed_from_phrase, Seed};
use dexguard_crypto::signing::Keypair;
use dexguard_crypto::vault::{encrypt_secret_with_params, Argon2Params, EncryptedSecret};
use dexguard_types::{DexguardError, PublicId, Result};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// An asymmetric keypair plus its derived public id.
///
/// Holds the only copy of the raw keypair; it is zeroized when this
/// value is dropped. The identity is never serialized — only its
/// sealed seed and public id are.
pub struct Identity {
    public_id: PublicId,
    keypair: Keypair,
}

// Identity does not implement Clone/Debug: the keypair must stay
// single-owner and out of logs.

impl Identity {
    /// Returns the public id (a pure function of the keypair).
    pub fn public_id(&self) -> PublicId {
        self.public_id
    }

    /// Returns the signing keypair.
    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }
}

// ---------------------------------------------------------------------------
// RecoveryQuestion
// ---------------------------------------------------------------------------

/// A recovery question with its salted, one-way hashed answer.
///
/// Only the hash and its salt are stored; answers are unrecoverable
/// from the record.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct RecoveryQuestion {
    /// The question text shown to the user.
    pub question: String,
    /// Hex-encoded random salt for this question.
    pub salt: String,
    /// Hex-encoded `SHA3-256(salt || normalized answer)`.
    pub hashed_answer: String,
}

impl RecoveryQuestion {
    /// Creates a question, hashing `answer` under a fresh random salt.
    pub fn new(question: impl Into<String>, answer: &str) -> Result<Self> {
        let salt = generate_answer_salt()?;
        let hash = salted_answer_hash(&salt, answer);
        Ok(Self {
            question: question.into(),
            salt: hex::encode(salt),
            hashed_answer: hex::encode(hash),
        })
    }

    /// Returns `true` if `answer` matches the stored hash.
    pub fn verify_answer(&self, answer: &str) -> bool {
        let Ok(salt) = hex::decode(&self.salt) else {
            return false;
        };
        hex::encode(salted_answer_hash(&salt, answer)) == self.hashed_answer
    }
}

// ---------------------------------------------------------------------------
// RecoveryBundle
// ---------------------------------------------------------------------------

/// The backup artifact for an identity.
///
/// Stored by the caller, not by the core. The phrase alone suffices
/// for offline reconstruction; the sealed seed and questions are
/// alternate paths.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecoveryBundle {
    /// The 12-word recovery phrase.
    pub recovery_phrase: Vec<String>,
    /// The seed, independently sealed (own salt and nonce).
    pub encrypted_seed: EncryptedSecret,
    /// Salted question/answer hashes. Generation fills placeholders —
    /// callers overwrite with user-chosen questions before persisting.
    pub recovery_questions: Vec<RecoveryQuestion>,
}

/// Placeholder questions attached at generation time.
const PLACEHOLDER_QUESTIONS: [&str; 2] = [
    "What was your first pet's name?",
    "In what city were you born?",
];

/// Placeholder answer hashed into freshly generated bundles.
const PLACEHOLDER_ANSWER: &str = "placeholder";

// ---------------------------------------------------------------------------
// WalletConfig
// ---------------------------------------------------------------------------

/// Options for wallet generation.
///
/// No `Debug` impl: the passphrase must not reach logs.
#[derive(Clone, Default)]
pub struct WalletConfig {
    /// Passphrase sealing the secret. When `None`, a random passphrase
    /// is generated and returned in
    /// [`GeneratedWallet::generated_passphrase`].
    pub passphrase: Option<String>,
    /// Argon2id cost profile for sealing. Embedders tune this to the
    /// device class; tests use light parameters.
    pub kdf: Option<Argon2Params>,
}

impl WalletConfig {
    fn kdf_params(&self) -> Argon2Params {
        self.kdf.unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// GeneratedWallet
// ---------------------------------------------------------------------------

/// Everything produced by one wallet generation.
pub struct GeneratedWallet {
    /// The new identity, sole owner of the raw keypair.
    pub identity: Identity,
    /// The seed sealed under the (supplied or generated) passphrase.
    pub encrypted_secret: EncryptedSecret,
    /// The backup artifact for the caller to store.
    pub recovery: RecoveryBundle,
    /// Set only when no passphrase was supplied: the generated one,
    /// in a zeroizing buffer. Without it the ciphertext would be
    /// permanently sealed.
    pub generated_passphrase: Option<Zeroizing<String>>,
}

/// Result of a phrase recovery: the identity plus the seed re-sealed
/// under the new passphrase, ready for the caller to persist.
pub struct RecoveredWallet {
    /// The reconstructed identity.
    pub identity: Identity,
    /// The seed re-sealed under the new passphrase.
    pub encrypted_secret: EncryptedSecret,
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Generates a new identity with its sealed secret and recovery bundle.
///
/// # Process
///
/// 1. Draw a fresh 32-byte seed from OS entropy.
/// 2. Derive the Ed25519 keypair and public id from it.
/// 3. Seal the seed under the configured (or freshly generated)
///    passphrase.
/// 4. Encode the seed as its 12-word recovery phrase and seal a second,
///    independent copy for the bundle.
/// 5. Attach placeholder recovery questions.
///
/// # Errors
///
/// Returns [`DexguardError::WalletGeneration`] only when entropy or
/// key derivation fails.
pub fn generate_wallet(config: &WalletConfig) -> Result<GeneratedWallet> {
    let seed = Seed::generate()?;
    let keypair = Keypair::from_seed(&seed);
    let public_id = keypair.public_id();

    let (passphrase, generated_passphrase) = match &config.passphrase {
        Some(supplied) => (Zeroizing::new(supplied.clone()), None),
        None => {
            let generated = generate_passphrase()?;
            (generated.clone(), Some(generated))
        }
    };

    let params = config.kdf_params();
    let encrypted_secret = seal_seed(&seed, &passphrase, &params)?;

    let recovery = RecoveryBundle {
        recovery_phrase: phrase_from_seed(&seed),
        // Independent sealing: own salt, own nonce.
        encrypted_seed: seal_seed(&seed, &passphrase, &params)?,
        recovery_questions: PLACEHOLDER_QUESTIONS
            .iter()
            .map(|q| RecoveryQuestion::new(*q, PLACEHOLDER_ANSWER))
            .collect::<Result<Vec<_>>>()?,
    };

    Ok(GeneratedWallet {
        identity: Identity { public_id, keypair },
        encrypted_secret,
        recovery,
        generated_passphrase,
    })
}

// ---------------------------------------------------------------------------
// Recovery
// ---------------------------------------------------------------------------

/// Reconstructs an identity from its recovery phrase.
///
/// The phrase is validated first — wrong length or an unknown word
/// fails with [`DexguardError::RecoveryPhraseInvalid`] before any
/// cryptographic work. On success the seed is re-sealed under
/// `new_passphrase`; recovery never creates a session.
pub fn recover_from_phrase<S: AsRef<str>>(
    phrase: &[S],
    new_passphrase: &str,
    kdf: &Argon2Params,
) -> Result<RecoveredWallet> {
    let seed = seed_from_phrase(phrase)?;
    let keypair = Keypair::from_seed(&seed);
    let public_id = keypair.public_id();

    let encrypted_secret =
        encrypt_secret_with_params(seed.as_bytes(), new_passphrase, kdf)?;

    Ok(RecoveredWallet {
        identity: Identity { public_id, keypair },
        encrypted_secret,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Seals a seed, mapping failures to the generation taxonomy.
fn seal_seed(seed: &Seed, passphrase: &str, params: &Argon2Params) -> Result<EncryptedSecret> {
    encrypt_secret_with_params(seed.as_bytes(), passphrase, params).map_err(|e| {
        DexguardError::WalletGeneration {
            reason: format!("sealing the seed failed: {e}"),
        }
    })
}

/// Generates a random hex passphrase (32 bytes of entropy).
fn generate_passphrase() -> Result<Zeroizing<String>> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| DexguardError::WalletGeneration {
            reason: format!("entropy source failed generating passphrase: {e}"),
        })?;
    let passphrase = Zeroizing::new(hex::encode(bytes));
    bytes.zeroize();
    Ok(passphrase)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
