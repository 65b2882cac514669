//! Cryptographic primitives for the dexguard credential core.
//!
//! This crate is the **sole** location for all cryptographic operations.
//! No other crate in the workspace may perform raw crypto directly.
//!
//! # Modules
//!
//! - [`vault`] — passphrase-based authenticated encryption at rest
//!   (Argon2id + XChaCha20-Poly1305)
//! - [`recovery`] — reversible 12-word mnemonic encoding of a 32-byte seed
//! - [`wordlist`] — the fixed, versioned syllable table behind [`recovery`]
//! - [`signing`] — Ed25519 keypair generation, signing, and verification
//! - [`hash`] — SHA3-256 hashing, public-id derivation, salted answer hashes

pub mod hash;
pub mod recovery;
pub mod signing;
pub mod vault;
pub mod wordlist;
