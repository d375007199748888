//! Nullable account registry.

use std::collections::BTreeMap;
use std::sync::Mutex;

use goc_host::{AccountRegistry, HostError};
use goc_types::{AccountName, PublicKey};

use crate::lock;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountRecord {
    pub creator: AccountName,
    pub key: PublicKey,
    pub privileged: bool,
    pub ram_usage: u64,
    /// `(ram_bytes, net_weight, cpu_weight)` last set by the contract.
    pub limits: (i64, i64, i64),
}

#[derive(Debug, Default)]
pub struct NullAccounts {
    accounts: Mutex<BTreeMap<AccountName, AccountRecord>>,
}

impl NullAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry where every name in `names` already exists.
    pub fn with_accounts(names: &[AccountName]) -> Self {
        let registry = Self::new();
        for name in names {
            registry.add(*name);
        }
        registry
    }

    pub fn add(&self, name: AccountName) {
        lock(&self.accounts).entry(name).or_default();
    }

    pub fn set_ram_usage(&self, account: AccountName, bytes: u64) {
        lock(&self.accounts).entry(account).or_default().ram_usage = bytes;
    }

    pub fn get(&self, account: AccountName) -> Option<AccountRecord> {
        lock(&self.accounts).get(&account).cloned()
    }

    pub fn limits(&self, account: AccountName) -> Option<(i64, i64, i64)> {
        self.get(account).map(|a| a.limits)
    }
}

impl AccountRegistry for NullAccounts {
    fn exists(&self, account: AccountName) -> bool {
        lock(&self.accounts).contains_key(&account)
    }

    fn ram_usage(&self, account: AccountName) -> u64 {
        lock(&self.accounts)
            .get(&account)
            .map(|a| a.ram_usage)
            .unwrap_or(0)
    }

    fn create_account(
        &self,
        creator: AccountName,
        name: AccountName,
        key: PublicKey,
    ) -> Result<(), HostError> {
        let mut accounts = lock(&self.accounts);
        if accounts.contains_key(&name) {
            return Err(HostError::AccountExists(name));
        }
        accounts.insert(
            name,
            AccountRecord {
                creator,
                key,
                ..AccountRecord::default()
            },
        );
        Ok(())
    }

    fn set_privileged(&self, account: AccountName, privileged: bool) -> Result<(), HostError> {
        let mut accounts = lock(&self.accounts);
        let record = accounts
            .get_mut(&account)
            .ok_or(HostError::UnknownAccount(account))?;
        record.privileged = privileged;
        Ok(())
    }

    fn set_resource_limits(
        &self,
        account: AccountName,
        ram_bytes: i64,
        net_weight: i64,
        cpu_weight: i64,
    ) -> Result<(), HostError> {
        let mut accounts = lock(&self.accounts);
        let record = accounts
            .get_mut(&account)
            .ok_or(HostError::UnknownAccount(account))?;
        record.limits = (ram_bytes, net_weight, cpu_weight);
        Ok(())
    }
}
