//! The effect journal collected while an action runs.

use crate::error::HostError;
use crate::traits::{
    AccountRegistry, DeferredKey, DeferredScheduler, DeferredTask, ProducerKey, ScheduleSink,
    TokenLedger, TokenOp,
};
use goc_types::{AccountName, Asset, ChainParameters, PublicKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    Token(TokenOp),
    CreateAccount {
        creator: AccountName,
        name: AccountName,
        key: PublicKey,
    },
    SetPrivileged {
        account: AccountName,
        privileged: bool,
    },
    SetResourceLimits {
        account: AccountName,
        ram_bytes: i64,
        net_weight: i64,
        cpu_weight: i64,
    },
    ProposeSchedule(Vec<ProducerKey>),
    SetChainParameters(ChainParameters),
    Schedule(DeferredTask),
    Cancel(DeferredKey),
}

/// Effects recorded by one action, in emission order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Effects {
    items: Vec<Effect>,
}

impl Effects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, effect: Effect) {
        self.items.push(effect);
    }

    pub fn transfer(&mut self, from: AccountName, to: AccountName, quantity: Asset, memo: &str) {
        self.push(Effect::Token(TokenOp::Transfer {
            from,
            to,
            quantity,
            memo: memo.to_string(),
        }));
    }

    pub fn issue(&mut self, to: AccountName, quantity: Asset, memo: &str) {
        self.push(Effect::Token(TokenOp::Issue {
            to,
            quantity,
            memo: memo.to_string(),
        }));
    }

    pub fn schedule(&mut self, task: DeferredTask) {
        self.push(Effect::Schedule(task));
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Effect> + '_ {
        self.items.iter()
    }

    pub fn token_ops(&self) -> Vec<TokenOp> {
        self.items
            .iter()
            .filter_map(|e| match e {
                Effect::Token(op) => Some(op.clone()),
                _ => None,
            })
            .collect()
    }
}

/// The collaborators injected into the contract.
#[derive(Clone)]
pub struct Host {
    pub tokens: Arc<dyn TokenLedger>,
    pub accounts: Arc<dyn AccountRegistry>,
    pub schedule: Arc<dyn ScheduleSink>,
    pub deferred: Arc<dyn DeferredScheduler>,
}

impl Host {
    pub fn new(
        tokens: Arc<dyn TokenLedger>,
        accounts: Arc<dyn AccountRegistry>,
        schedule: Arc<dyn ScheduleSink>,
        deferred: Arc<dyn DeferredScheduler>,
    ) -> Self {
        Self {
            tokens,
            accounts,
            schedule,
            deferred,
        }
    }

    /// Hand `effects` to the collaborators.
    ///
    /// Every non-token effect is checked first, then the token operations go
    /// as one batch, then the remaining effects are applied. A rejection in
    /// either of the first two steps leaves every collaborator untouched.
    pub fn commit(&self, effects: Effects) -> Result<(), HostError> {
        self.prepare(&effects)?;
        let ops = effects.token_ops();
        if !ops.is_empty() {
            self.tokens.apply(&ops)?;
        }
        for effect in effects.items {
            let result = match effect {
                Effect::Token(_) => Ok(()),
                Effect::CreateAccount { creator, name, key } => {
                    self.accounts.create_account(creator, name, key)
                }
                Effect::SetPrivileged {
                    account,
                    privileged,
                } => self.accounts.set_privileged(account, privileged),
                Effect::SetResourceLimits {
                    account,
                    ram_bytes,
                    net_weight,
                    cpu_weight,
                } => self
                    .accounts
                    .set_resource_limits(account, ram_bytes, net_weight, cpu_weight),
                Effect::ProposeSchedule(producers) => {
                    tracing::info!(size = producers.len(), "proposing producer schedule");
                    self.schedule.propose_schedule(&producers)
                }
                Effect::SetChainParameters(params) => self.schedule.set_chain_parameters(&params),
                Effect::Schedule(task) => self.deferred.schedule(task),
                Effect::Cancel(key) => self.deferred.cancel(key),
            };
            if let Err(e) = result {
                tracing::error!(error = %e, "collaborator rejected an effect it had accepted in prepare");
                return Err(e);
            }
        }
        Ok(())
    }

    /// Check every non-token effect against its collaborator without applying it.
    fn prepare(&self, effects: &Effects) -> Result<(), HostError> {
        let mut created = BTreeSet::new();
        for effect in effects.iter() {
            match effect {
                Effect::Token(_) | Effect::Cancel(_) => {}
                Effect::CreateAccount { creator, name, .. } => {
                    if !created.insert(*name) {
                        return Err(HostError::AccountExists(*name));
                    }
                    self.accounts.check_create_account(*creator, *name)?;
                }
                Effect::SetPrivileged { account, .. } | Effect::SetResourceLimits { account, .. } => {
                    if !created.contains(account) {
                        self.accounts.check_account(*account)?;
                    }
                }
                Effect::ProposeSchedule(producers) => self.schedule.check_schedule(producers)?,
                Effect::SetChainParameters(params) => self.schedule.check_chain_parameters(params)?,
                Effect::Schedule(task) => self.deferred.check_task(task)?,
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::DeferredAction;
    use goc_types::{Symbol, Timestamp};
    use std::sync::Mutex;

    const SYS: Symbol = Symbol::from_static(4, "SYS");

    #[test]
    fn token_ops_keep_emission_order() {
        let alice = AccountName::from_static("alice");
        let bob = AccountName::from_static("bob");
        let mut fx = Effects::new();
        fx.transfer(alice, bob, Asset::new(1, SYS), "a");
        fx.schedule(DeferredTask {
            action: DeferredAction::Refund { owner: alice },
            execute_at: Timestamp::new(10),
        });
        fx.issue(bob, Asset::new(2, SYS), "b");
        assert_eq!(fx.len(), 3);
        let ops = fx.token_ops();
        assert_eq!(ops.len(), 2);
        assert!(matches!(ops[0], TokenOp::Transfer { .. }));
        assert!(matches!(ops[1], TokenOp::Issue { .. }));
    }

    #[derive(Default)]
    struct Ledger(Mutex<Vec<TokenOp>>);

    impl TokenLedger for Ledger {
        fn balance(&self, _: AccountName, symbol: Symbol) -> Asset {
            Asset::zero(symbol)
        }
        fn supply(&self, symbol: Symbol) -> Asset {
            Asset::zero(symbol)
        }
        fn apply(&self, ops: &[TokenOp]) -> Result<(), HostError> {
            self.0.lock().unwrap().extend_from_slice(ops);
            Ok(())
        }
    }

    struct Accounts;

    impl AccountRegistry for Accounts {
        fn exists(&self, account: AccountName) -> bool {
            account == AccountName::from_static("alice")
        }
        fn ram_usage(&self, _: AccountName) -> u64 {
            0
        }
        fn create_account(&self, _: AccountName, name: AccountName, _: PublicKey) -> Result<(), HostError> {
            Err(HostError::AccountExists(name))
        }
        fn set_privileged(&self, _: AccountName, _: bool) -> Result<(), HostError> {
            Ok(())
        }
        fn set_resource_limits(&self, account: AccountName, _: i64, _: i64, _: i64) -> Result<(), HostError> {
            if self.exists(account) {
                Ok(())
            } else {
                Err(HostError::UnknownAccount(account))
            }
        }
    }

    struct Sink;

    impl ScheduleSink for Sink {
        fn propose_schedule(&self, _: &[ProducerKey]) -> Result<(), HostError> {
            Ok(())
        }
        fn set_chain_parameters(&self, _: &ChainParameters) -> Result<(), HostError> {
            Ok(())
        }
    }

    /// Refuses every task.
    struct FullScheduler;

    impl DeferredScheduler for FullScheduler {
        fn schedule(&self, _: DeferredTask) -> Result<(), HostError> {
            Err(HostError::Rejected("queue full".into()))
        }
        fn cancel(&self, _: DeferredKey) -> Result<(), HostError> {
            Ok(())
        }
        fn check_task(&self, _: &DeferredTask) -> Result<(), HostError> {
            Err(HostError::Rejected("queue full".into()))
        }
        fn take_due(&self, _: Timestamp) -> Vec<DeferredTask> {
            Vec::new()
        }
    }

    fn host(ledger: Arc<Ledger>) -> Host {
        Host::new(ledger, Arc::new(Accounts), Arc::new(Sink), Arc::new(FullScheduler))
    }

    #[test]
    fn rejected_task_keeps_tokens_in_place() {
        let ledger = Arc::new(Ledger::default());
        let alice = AccountName::from_static("alice");
        let mut fx = Effects::new();
        fx.transfer(alice, AccountName::from_static("goc"), Asset::new(5, SYS), "fee");
        fx.schedule(DeferredTask {
            action: DeferredAction::Refund { owner: alice },
            execute_at: Timestamp::new(10),
        });
        let err = host(ledger.clone()).commit(fx).unwrap_err();
        assert_eq!(err, HostError::Rejected("queue full".into()));
        assert!(ledger.0.lock().unwrap().is_empty());
    }

    #[test]
    fn unknown_account_is_caught_before_tokens_move() {
        let ledger = Arc::new(Ledger::default());
        let bob = AccountName::from_static("bob");
        let mut fx = Effects::new();
        fx.issue(bob, Asset::new(5, SYS), "pay");
        fx.push(Effect::SetResourceLimits {
            account: bob,
            ram_bytes: 1,
            net_weight: 2,
            cpu_weight: 3,
        });
        let err = host(ledger.clone()).commit(fx).unwrap_err();
        assert_eq!(err, HostError::UnknownAccount(bob));
        assert!(ledger.0.lock().unwrap().is_empty());
    }

    #[test]
    fn duplicate_account_creation_is_caught_before_tokens_move() {
        let ledger = Arc::new(Ledger::default());
        let alice = AccountName::from_static("alice");
        let mut fx = Effects::new();
        fx.issue(alice, Asset::new(5, SYS), "pay");
        fx.push(Effect::CreateAccount {
            creator: alice,
            name: alice,
            key: PublicKey::NULL,
        });
        let err = host(ledger.clone()).commit(fx).unwrap_err();
        assert_eq!(err, HostError::AccountExists(alice));
        assert!(ledger.0.lock().unwrap().is_empty());
    }

    #[test]
    fn deferred_keys_identify_tasks() {
        let alice = AccountName::from_static("alice");
        let name = AccountName::from_static("goc");
        assert_eq!(
            DeferredAction::Refund { owner: alice }.key(),
            DeferredKey::Refund(alice)
        );
        assert_ne!(
            DeferredAction::BidRefund {
                bidder: alice,
                newname: name
            }
            .key(),
            DeferredKey::Refund(alice)
        );
    }
}
