//! The authentication service: the single entry point the UI layer
//! calls into.
//!
//! Owns the [`SessionStore`] for its process — no other component
//! touches session state, in memory or persisted. Address and
//! signature validation are delegated to the [`LedgerConnector`]
//! capability; a connector failure aborts authentication, it is never
//! retried or downgraded here.

use std::sync::Arc;

use dexguard_crypto::hash::public_id_for_address;
use dexguard_crypto::vault::Argon2Params;
use dexguard_session::{SessionLookup, SessionStore};
use dexguard_types::session::{Permission, Session, SessionStats};
use dexguard_types::{
    DexguardError, KeyValueStore, LedgerAddress, LedgerConnector, Result, SessionId,
};

use crate::identity::{
    generate_wallet, recover_from_phrase, GeneratedWallet, RecoveredWallet, WalletConfig,
};

/// Fixed session lifetime granted on authentication.
pub const SESSION_TTL_HOURS: i64 = 24;

// ---------------------------------------------------------------------------
// AuthenticationService
// ---------------------------------------------------------------------------

/// Orchestrates identity generation, authentication, sessions, and
/// recovery.
pub struct AuthenticationService {
    connector: Arc<dyn LedgerConnector>,
    sessions: SessionStore,
    recovery_kdf: Argon2Params,
}

impl AuthenticationService {
    /// Builds the service, reloading persisted sessions from `store`.
    ///
    /// # Errors
    ///
    /// Returns [`DexguardError::Storage`] if the session store cannot
    /// reload its namespace.
    pub fn new(connector: Arc<dyn LedgerConnector>, store: Box<dyn KeyValueStore>) -> Result<Self> {
        Ok(Self {
            connector,
            sessions: SessionStore::open(store)?,
            recovery_kdf: Argon2Params::default(),
        })
    }

    /// Overrides the Argon2id cost profile used when recovery re-seals
    /// a seed. Embedders tune this to the device class.
    pub fn with_recovery_kdf(mut self, params: Argon2Params) -> Self {
        self.recovery_kdf = params;
        self
    }

    // -- Wallet lifecycle -------------------------------------------------

    /// Generates a new identity with sealed secret and recovery bundle.
    ///
    /// See [`identity::generate_wallet`](crate::identity::generate_wallet).
    pub fn generate_wallet(&self, config: &WalletConfig) -> Result<GeneratedWallet> {
        let wallet = generate_wallet(config)?;
        tracing::info!(public_id = %wallet.identity.public_id(), "wallet generated");
        Ok(wallet)
    }

    /// Reconstructs an identity from its 12-word recovery phrase and
    /// re-seals the seed under `new_passphrase`.
    ///
    /// Recovery and authentication are separate acts: no session is
    /// created here, and the caller authenticates afterwards if it
    /// wants one.
    ///
    /// # Errors
    ///
    /// - [`DexguardError::RecoveryPhraseInvalid`] for a malformed
    ///   phrase, before any cryptographic work.
    /// - [`DexguardError::Encryption`] if re-sealing fails.
    pub fn recover_wallet<S: AsRef<str>>(
        &self,
        phrase: &[S],
        new_passphrase: &str,
    ) -> Result<RecoveredWallet> {
        let recovered = recover_from_phrase(phrase, new_passphrase, &self.recovery_kdf)?;
        tracing::info!(public_id = %recovered.identity.public_id(), "wallet recovered from phrase");
        Ok(recovered)
    }

    // -- Authentication ---------------------------------------------------

    /// Authenticates a ledger address and opens a session.
    ///
    /// The address is validated through the ledger connector. When a
    /// signature is supplied it must come with its message and must
    /// verify — authentication never proceeds past a failed
    /// verification. The session carries the default permission set
    /// and a fixed 24-hour TTL.
    ///
    /// # Errors
    ///
    /// - [`DexguardError::InvalidAddress`] if the connector rejects the
    ///   address (or fails).
    /// - [`DexguardError::SignatureVerification`] if signature and
    ///   message are not supplied together, the connector fails, or
    ///   the signature does not verify.
    pub fn authenticate(
        &self,
        address: &LedgerAddress,
        signature: Option<&[u8]>,
        message: Option<&[u8]>,
    ) -> Result<Session> {
        let valid = self
            .connector
            .is_valid_address(address)
            .map_err(|e| DexguardError::InvalidAddress {
                reason: format!("ledger connector failed: {e}"),
            })?;
        if !valid {
            return Err(DexguardError::InvalidAddress {
                reason: "rejected by ledger connector".into(),
            });
        }

        match (signature, message) {
            (Some(signature), Some(message)) => {
                let verified = self
                    .connector
                    .verify_signature(address, message, signature)
                    .map_err(|e| DexguardError::SignatureVerification {
                        reason: format!("ledger connector failed: {e}"),
                    })?;
                if !verified {
                    tracing::warn!(%address, "signature verification failed");
                    return Err(DexguardError::SignatureVerification {
                        reason: "signature does not verify for this address".into(),
                    });
                }
            }
            (None, None) => {}
            _ => {
                return Err(DexguardError::SignatureVerification {
                    reason: "signature and message must be supplied together".into(),
                });
            }
        }

        let public_id = public_id_for_address(address);
        let session = self.sessions.create(
            public_id,
            chrono::Duration::hours(SESSION_TTL_HOURS),
            Permission::default_set(),
        )?;

        // The session id is a bearer credential — never logged.
        tracing::info!(%public_id, "session created");
        Ok(session)
    }

    // -- Session lifecycle ------------------------------------------------

    /// Returns the live session under `session_id`, applying lazy
    /// expiry. Missing, logged-out, and expired sessions all read as
    /// `None`.
    pub fn validate_session(&self, session_id: &SessionId) -> Result<Option<Session>> {
        self.sessions.get(session_id)
    }

    /// Like [`validate_session`](Self::validate_session), but with a
    /// typed failure for callers that must distinguish why a session
    /// is unusable.
    ///
    /// # Errors
    ///
    /// - [`DexguardError::SessionExpired`] if the record outlived its
    ///   TTL (and has now been removed).
    /// - [`DexguardError::SessionNotFound`] otherwise.
    pub fn require_session(&self, session_id: &SessionId) -> Result<Session> {
        match self.sessions.lookup(session_id)? {
            SessionLookup::Live(session) => Ok(session),
            SessionLookup::Expired => Err(DexguardError::SessionExpired {
                reason: "session outlived its ttl".into(),
            }),
            SessionLookup::Missing => Err(DexguardError::SessionNotFound {
                reason: "no active session under this id".into(),
            }),
        }
    }

    /// Ends a session. Returns `true` exactly once per session;
    /// repeated calls and unknown ids return `false`.
    pub fn logout(&self, session_id: &SessionId) -> Result<bool> {
        let ended = self.sessions.deactivate(session_id)?;
        if ended {
            tracing::info!("session logged out");
        }
        Ok(ended)
    }

    /// Statistics over the in-memory session snapshot.
    pub fn session_stats(&self) -> Result<SessionStats> {
        self.sessions.stats()
    }
}
