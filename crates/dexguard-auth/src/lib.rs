//! Authentication and identity orchestration for the dexguard core.
//!
//! This crate is the public surface consumed by the UI and account
//! layers. It wires the crypto primitives, the session store, and the
//! external ledger connector into the credential lifecycle:
//!
//! - **Generate** — new identity + sealed secret + recovery bundle
//! - **Authenticate** — address (and optional signature) → session
//! - **Validate / Logout** — session lifecycle with lazy expiry
//! - **Recover** — 12-word phrase → reconstructed identity, re-sealed
//!   under a new passphrase
//!
//! # Modules
//!
//! - [`service`] — the authentication service owning the session store
//! - [`identity`] — identity generation and recovery bundles
//! - [`connector`] — in-process Ed25519 ledger connector
//! - [`policy`] — security levels and their resolved policies
//! - [`account`] — account registry built on top of sessions

pub mod account;
pub mod connector;
pub mod identity;
pub mod policy;
pub mod service;

pub use identity::{GeneratedWallet, Identity, RecoveredWallet, RecoveryBundle, WalletConfig};
pub use service::AuthenticationService;
