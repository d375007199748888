//! Collaborator traits.
//!
//! All methods take `&self`: implementations own their synchronisation, the
//! same way a storage backend would.
//!
//! The `check_*` methods are the prepare half of a commit. An implementation
//! that overrides one must reject exactly what the matching call rejects.

use crate::error::HostError;
use goc_types::{AccountName, Asset, ChainParameters, PublicKey, Symbol, Timestamp};
use serde::{Deserialize, Serialize};

/// A single balance movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenOp {
    Transfer {
        from: AccountName,
        to: AccountName,
        quantity: Asset,
        memo: String,
    },
    /// Mint new supply directly into `to`.
    Issue {
        to: AccountName,
        quantity: Asset,
        memo: String,
    },
}

/// The token contract.
pub trait TokenLedger: Send + Sync {
    fn balance(&self, owner: AccountName, symbol: Symbol) -> Asset;

    fn supply(&self, symbol: Symbol) -> Asset;

    /// Apply every operation in order, or none of them.
    fn apply(&self, ops: &[TokenOp]) -> Result<(), HostError>;
}

/// Account creation, privileges and resource limits.
pub trait AccountRegistry: Send + Sync {
    fn exists(&self, account: AccountName) -> bool;

    /// RAM bytes the account currently occupies.
    fn ram_usage(&self, account: AccountName) -> u64;

    fn create_account(
        &self,
        creator: AccountName,
        name: AccountName,
        key: PublicKey,
    ) -> Result<(), HostError>;

    fn set_privileged(&self, account: AccountName, privileged: bool) -> Result<(), HostError>;

    fn set_resource_limits(
        &self,
        account: AccountName,
        ram_bytes: i64,
        net_weight: i64,
        cpu_weight: i64,
    ) -> Result<(), HostError>;

    /// Fails exactly when `create_account` would.
    fn check_create_account(&self, _creator: AccountName, name: AccountName) -> Result<(), HostError> {
        if self.exists(name) {
            return Err(HostError::AccountExists(name));
        }
        Ok(())
    }

    /// Fails exactly when `set_privileged` or `set_resource_limits` would.
    fn check_account(&self, account: AccountName) -> Result<(), HostError> {
        if !self.exists(account) {
            return Err(HostError::UnknownAccount(account));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProducerKey {
    pub producer_name: AccountName,
    pub block_signing_key: PublicKey,
}

/// Block production machinery.
pub trait ScheduleSink: Send + Sync {
    fn propose_schedule(&self, producers: &[ProducerKey]) -> Result<(), HostError>;

    fn set_chain_parameters(&self, params: &ChainParameters) -> Result<(), HostError>;

    fn check_schedule(&self, _producers: &[ProducerKey]) -> Result<(), HostError> {
        Ok(())
    }

    fn check_chain_parameters(&self, _params: &ChainParameters) -> Result<(), HostError> {
        Ok(())
    }
}

/// An action executed later by the deferred scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeferredAction {
    Refund {
        owner: AccountName,
    },
    BidRefund {
        bidder: AccountName,
        newname: AccountName,
    },
}

/// Identity of a pending deferred task. Scheduling a task with a key that
/// is already pending replaces the earlier one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DeferredKey {
    Refund(AccountName),
    BidRefund(AccountName, AccountName),
}

impl DeferredAction {
    pub fn key(&self) -> DeferredKey {
        match *self {
            Self::Refund { owner } => DeferredKey::Refund(owner),
            Self::BidRefund { bidder, newname } => DeferredKey::BidRefund(bidder, newname),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeferredTask {
    pub action: DeferredAction,
    pub execute_at: Timestamp,
}

pub trait DeferredScheduler: Send + Sync {
    /// Schedule `task`, replacing any pending task with the same key.
    fn schedule(&self, task: DeferredTask) -> Result<(), HostError>;

    fn cancel(&self, key: DeferredKey) -> Result<(), HostError>;

    /// Fails exactly when `schedule(task)` would.
    fn check_task(&self, _task: &DeferredTask) -> Result<(), HostError> {
        Ok(())
    }

    /// Remove and return every task due at `now`, earliest first.
    fn take_due(&self, now: Timestamp) -> Vec<DeferredTask>;
}
