//! Account registry: per-address records layered on top of the
//! credential core.
//!
//! An [`AccountRecord`] tracks what the UI needs between sessions —
//! balance, activity timestamps, a bounded transaction history, and
//! the chosen [`SecurityLevel`](crate::policy::SecurityLevel). Records
//! persist through the same generic key-value capability as sessions,
//! under their own namespace.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use dexguard_types::{
    DexguardError, KeyValueStore, LedgerAddress, LedgerConnector, Result, Timestamp,
};

use crate::policy::{SecurityLevel, SecurityPolicy};

/// Key namespace for persisted account records.
const KEY_PREFIX: &str = "account/";

/// Transaction history entries retained per account, newest first.
const HISTORY_LIMIT: usize = 100;

// ---------------------------------------------------------------------------
// TransactionRecord
// ---------------------------------------------------------------------------

/// Kind of a recorded transaction.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Token-for-token swap.
    Swap,
    /// Stake into a pool.
    Stake,
    /// Withdraw a stake.
    Unstake,
    /// Deposit into the account.
    Deposit,
    /// Withdraw from the account.
    Withdraw,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Swap => write!(f, "swap"),
            Self::Stake => write!(f, "stake"),
            Self::Unstake => write!(f, "unstake"),
            Self::Deposit => write!(f, "deposit"),
            Self::Withdraw => write!(f, "withdraw"),
        }
    }
}

/// Settlement status of a recorded transaction.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Confirmed on the ledger.
    Success,
    /// Rejected or reverted.
    Failed,
    /// Submitted, not yet confirmed.
    Pending,
}

/// One entry in an account's transaction history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Ledger transaction signature (opaque).
    pub signature: String,
    /// What the transaction did.
    pub kind: TransactionKind,
    /// Source token symbol.
    pub from_token: String,
    /// Destination token symbol.
    pub to_token: String,
    /// Amount in `from_token` units.
    pub amount: f64,
    /// When the transaction was recorded.
    pub timestamp: Timestamp,
    /// Settlement status at record time.
    pub status: TransactionStatus,
    /// Fee paid, in native units.
    pub fee: f64,
}

// ---------------------------------------------------------------------------
// AccountRecord
// ---------------------------------------------------------------------------

/// Persistent per-address account state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccountRecord {
    /// The ledger address this account belongs to.
    pub address: LedgerAddress,
    /// Last observed balance, in native units.
    pub balance: f64,
    /// Whether the account is active.
    pub active: bool,
    /// Creation time.
    pub created_at: Timestamp,
    /// Last read or write touching this account.
    pub last_activity: Timestamp,
    /// Chosen security tier.
    pub security_level: SecurityLevel,
    /// Bounded history, newest first.
    pub transactions: Vec<TransactionRecord>,
    /// Lifetime count of recorded transactions (not bounded by the
    /// history limit).
    pub total_trades: u64,
}

impl AccountRecord {
    /// Resolves this account's security level to its policy.
    pub fn policy(&self) -> SecurityPolicy {
        self.security_level.policy()
    }
}

/// Registry-wide aggregate statistics.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccountStats {
    /// Number of registered accounts.
    pub total_accounts: usize,
    /// Number with `active == true`.
    pub active_accounts: usize,
    /// Sum of last observed balances.
    pub total_balance: f64,
    /// Sum of lifetime transaction counts.
    pub total_trades: u64,
}

// ---------------------------------------------------------------------------
// AccountRegistry
// ---------------------------------------------------------------------------

/// Owner of all account records for one process.
///
/// Read-modify-write cycles run under one mutex so concurrent calls
/// cannot interleave between load and save.
pub struct AccountRegistry {
    connector: Arc<dyn LedgerConnector>,
    store: Mutex<Box<dyn KeyValueStore>>,
}

impl AccountRegistry {
    /// Creates a registry over `store`, validating addresses and
    /// reading balances through `connector`.
    pub fn new(connector: Arc<dyn LedgerConnector>, store: Box<dyn KeyValueStore>) -> Self {
        Self {
            connector,
            store: Mutex::new(store),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Box<dyn KeyValueStore>>> {
        self.store.lock().map_err(|_| DexguardError::Storage {
            reason: "account registry mutex poisoned".into(),
        })
    }

    /// Registers an account for `address`.
    ///
    /// The address must pass connector validation and must not already
    /// have an account; the initial balance is read from the
    /// connector.
    ///
    /// # Errors
    ///
    /// - [`DexguardError::InvalidAddress`] if the connector rejects
    ///   the address or an account already exists for it.
    pub fn create_account(
        &self,
        address: &LedgerAddress,
        security_level: SecurityLevel,
    ) -> Result<AccountRecord> {
        if !self.connector.is_valid_address(address)? {
            return Err(DexguardError::InvalidAddress {
                reason: "rejected by ledger connector".into(),
            });
        }

        let store = self.lock()?;
        let key = record_key(address);
        if store.load(&key)?.is_some() {
            return Err(DexguardError::InvalidAddress {
                reason: format!("an account already exists for '{address}'"),
            });
        }

        let now = Timestamp::now();
        let record = AccountRecord {
            address: address.clone(),
            balance: self.connector.get_balance(address)?,
            active: true,
            created_at: now,
            last_activity: now,
            security_level,
            transactions: Vec::new(),
            total_trades: 0,
        };

        save_record(&**store, &record)?;
        tracing::info!(%address, %security_level, "account created");
        Ok(record)
    }

    /// Loads the account for `address`, refreshing its balance from
    /// the connector. Returns `None` for unregistered addresses.
    pub fn get_account(&self, address: &LedgerAddress) -> Result<Option<AccountRecord>> {
        let store = self.lock()?;
        let Some(mut record) = load_record(&**store, address)? else {
            return Ok(None);
        };

        record.balance = self.connector.get_balance(address)?;
        record.last_activity = Timestamp::now();
        save_record(&**store, &record)?;
        Ok(Some(record))
    }

    /// Appends a transaction to the account's history.
    ///
    /// History is capped at 100 entries (newest first); the lifetime
    /// counter keeps growing past the cap.
    ///
    /// # Errors
    ///
    /// - [`DexguardError::InvalidAddress`] if no account exists for
    ///   `address`.
    pub fn record_transaction(
        &self,
        address: &LedgerAddress,
        transaction: TransactionRecord,
    ) -> Result<AccountRecord> {
        let store = self.lock()?;
        let Some(mut record) = load_record(&**store, address)? else {
            return Err(DexguardError::InvalidAddress {
                reason: format!("no account registered for '{address}'"),
            });
        };

        record.transactions.insert(0, transaction);
        record.transactions.truncate(HISTORY_LIMIT);
        record.total_trades += 1;
        record.last_activity = Timestamp::now();

        save_record(&**store, &record)?;
        Ok(record)
    }

    /// Aggregate statistics over all registered accounts.
    pub fn account_stats(&self) -> Result<AccountStats> {
        let store = self.lock()?;
        let mut stats = AccountStats {
            total_accounts: 0,
            active_accounts: 0,
            total_balance: 0.0,
            total_trades: 0,
        };

        for key in store.list(KEY_PREFIX)? {
            let Some(bytes) = store.load(&key)? else {
                continue;
            };
            let record: AccountRecord =
                serde_json::from_slice(&bytes).map_err(|e| DexguardError::Storage {
                    reason: format!("corrupt account record under '{key}': {e}"),
                })?;

            stats.total_accounts += 1;
            if record.active {
                stats.active_accounts += 1;
            }
            stats.total_balance += record.balance;
            stats.total_trades += record.total_trades;
        }
        Ok(stats)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn record_key(address: &LedgerAddress) -> String {
    format!("{KEY_PREFIX}{address}")
}

fn load_record(store: &dyn KeyValueStore, address: &LedgerAddress) -> Result<Option<AccountRecord>> {
    let Some(bytes) = store.load(&record_key(address))? else {
        return Ok(None);
    };
    let record = serde_json::from_slice(&bytes).map_err(|e| DexguardError::Storage {
        reason: format!("corrupt account record for '{address}': {e}"),
    })?;
    Ok(Some(record))
}

fn save_record(store: &dyn KeyValueStore, record: &AccountRecord) -> Result<()> {
    let bytes = serde_json::to_vec(record).map_err(|e| DexguardError::Storage {
        reason: format!("failed to serialize account record: {e}"),
    })?;
    store.save(&record_key(&record.address), &bytes)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
