//! Security levels and their resolved policies.
//!
//! Accounts opt into one of three closed levels; each resolves to an
//! explicit [`SecurityPolicy`] record. Enforcement happens at the
//! UI/account boundary — the credential core itself never consults a
//! policy.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SecurityLevel
// ---------------------------------------------------------------------------

/// Account security tier.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityLevel {
    /// Small limits, no confirmations.
    #[default]
    Basic,
    /// Medium limits, confirmations required.
    Enhanced,
    /// Large limits, confirmations required.
    Premium,
}

impl SecurityLevel {
    /// Resolves this level to its policy record.
    pub fn policy(&self) -> SecurityPolicy {
        match self {
            Self::Basic => SecurityPolicy {
                max_transaction_amount: 10.0,
                require_confirmation: false,
                enable_staking: true,
                enable_advanced_trading: false,
            },
            Self::Enhanced => SecurityPolicy {
                max_transaction_amount: 100.0,
                require_confirmation: true,
                enable_staking: true,
                enable_advanced_trading: true,
            },
            Self::Premium => SecurityPolicy {
                max_transaction_amount: 1000.0,
                require_confirmation: true,
                enable_staking: true,
                enable_advanced_trading: true,
            },
        }
    }
}

impl fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic => write!(f, "basic"),
            Self::Enhanced => write!(f, "enhanced"),
            Self::Premium => write!(f, "premium"),
        }
    }
}

// ---------------------------------------------------------------------------
// SecurityPolicy
// ---------------------------------------------------------------------------

/// The concrete rules a [`SecurityLevel`] resolves to.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SecurityPolicy {
    /// Largest single transaction, in native units.
    pub max_transaction_amount: f64,
    /// Whether transactions need explicit user confirmation.
    pub require_confirmation: bool,
    /// Whether staking operations are enabled.
    pub enable_staking: bool,
    /// Whether advanced order types are enabled.
    pub enable_advanced_trading: bool,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_resolve_to_expected_limits() {
        assert_eq!(SecurityLevel::Basic.policy().max_transaction_amount, 10.0);
        assert_eq!(SecurityLevel::Enhanced.policy().max_transaction_amount, 100.0);
        assert_eq!(SecurityLevel::Premium.policy().max_transaction_amount, 1000.0);
    }

    #[test]
    fn only_basic_skips_confirmation() {
        assert!(!SecurityLevel::Basic.policy().require_confirmation);
        assert!(SecurityLevel::Enhanced.policy().require_confirmation);
        assert!(SecurityLevel::Premium.policy().require_confirmation);
    }

    #[test]
    fn staking_enabled_everywhere_advanced_trading_gated() {
        for level in [SecurityLevel::Basic, SecurityLevel::Enhanced, SecurityLevel::Premium] {
            assert!(level.policy().enable_staking);
        }
        assert!(!SecurityLevel::Basic.policy().enable_advanced_trading);
        assert!(SecurityLevel::Premium.policy().enable_advanced_trading);
    }

    #[test]
    fn default_level_is_basic() {
        assert_eq!(SecurityLevel::default(), SecurityLevel::Basic);
    }

    #[test]
    fn level_serializes_snake_case() -> std::result::Result<(), Box<dyn std::error::Error>> {
        assert_eq!(serde_json::to_string(&SecurityLevel::Enhanced)?, "\"enhanced\"");
        Ok(())
    }
}
