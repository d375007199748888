//! Staked bandwidth and delayed refunds.
//!
//! One [`DelegatedBandwidth`] row exists per (owner, beneficiary) pair. The
//! beneficiary's [`UserResources`] row always equals the sum of the rows
//! delegated to it. Unstaked tokens wait in a single [`RefundRequest`] per
//! owner until [`REFUND_DELAY_SECS`] after the most recent unstake.

use goc_store::{Field, Journaled, Persisted, Row, Schema, Table};
use goc_types::{AccountName, Asset, Symbol, Timestamp, SECONDS_PER_DAY};
use serde::{Deserialize, Serialize};

use crate::error::ResourceError;

pub const REFUND_DELAY_SECS: u64 = 3 * SECONDS_PER_DAY;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelegatedBandwidth {
    /// Owner of the stake: the payer, or the beneficiary for transfers.
    pub from: AccountName,
    pub to: AccountName,
    pub net_weight: Asset,
    pub cpu_weight: Asset,
}

impl DelegatedBandwidth {
    pub fn is_empty(&self) -> bool {
        self.net_weight.amount == 0 && self.cpu_weight.amount == 0
    }
}

impl Row for DelegatedBandwidth {
    type Key = (AccountName, AccountName);
    const TABLE: &'static str = "delband";

    fn primary_key(&self) -> Self::Key {
        (self.from, self.to)
    }
}

impl Persisted for DelegatedBandwidth {
    const SCHEMA: Schema = Schema {
        entity: "delegated_bandwidth",
        table: "delband",
        version: 1,
        fields: &[
            Field::new("from", "name"),
            Field::new("to", "name"),
            Field::new("net_weight", "asset"),
            Field::new("cpu_weight", "asset"),
        ],
    };
}

/// Total resources held by an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResources {
    pub owner: AccountName,
    pub net_weight: Asset,
    pub cpu_weight: Asset,
    pub ram_bytes: i64,
}

impl Row for UserResources {
    type Key = AccountName;
    const TABLE: &'static str = "userres";

    fn primary_key(&self) -> AccountName {
        self.owner
    }
}

impl Persisted for UserResources {
    const SCHEMA: Schema = Schema {
        entity: "user_resources",
        table: "userres",
        version: 1,
        fields: &[
            Field::new("owner", "name"),
            Field::new("net_weight", "asset"),
            Field::new("cpu_weight", "asset"),
            Field::new("ram_bytes", "int64"),
        ],
    };
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefundRequest {
    pub owner: AccountName,
    pub request_time: Timestamp,
    pub net_amount: Asset,
    pub cpu_amount: Asset,
}

impl RefundRequest {
    pub fn release_time(&self) -> Timestamp {
        self.request_time.plus(REFUND_DELAY_SECS)
    }

    pub fn total(&self) -> Option<Asset> {
        self.net_amount.checked_add(self.cpu_amount)
    }
}

impl Row for RefundRequest {
    type Key = AccountName;
    const TABLE: &'static str = "refunds";

    fn primary_key(&self) -> AccountName {
        self.owner
    }
}

impl Persisted for RefundRequest {
    const SCHEMA: Schema = Schema {
        entity: "refund_request",
        table: "refunds",
        version: 1,
        fields: &[
            Field::new("owner", "name"),
            Field::new("request_time", "time_point_sec"),
            Field::new("net_amount", "asset"),
            Field::new("cpu_amount", "asset"),
        ],
    };
}

/// What a successful `delegate` did, for the caller to turn into effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StakeChange {
    /// Account whose tokens are locked.
    pub payer: AccountName,
    /// Owner of the delegation row.
    pub owner: AccountName,
    pub beneficiary: AccountName,
    pub total: Asset,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DelegationLedger {
    delegations: Table<DelegatedBandwidth>,
    resources: Table<UserResources>,
    refunds: Table<RefundRequest>,
}

fn validate_pair(net: Asset, cpu: Asset) -> Result<Asset, ResourceError> {
    if net.symbol != cpu.symbol {
        return Err(ResourceError::InvalidAmount(
            "net and cpu must use the same symbol".into(),
        ));
    }
    if net.amount < 0 || cpu.amount < 0 {
        return Err(ResourceError::InvalidAmount(
            "must stake a non-negative amount".into(),
        ));
    }
    let total = net
        .checked_add(cpu)
        .ok_or_else(|| ResourceError::InvalidAmount("stake amount overflows".into()))?;
    if total.amount == 0 {
        return Err(ResourceError::InvalidAmount(
            "must stake a positive amount".into(),
        ));
    }
    Ok(total)
}

impl DelegationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delegation(&self, from: AccountName, to: AccountName) -> Option<&DelegatedBandwidth> {
        self.delegations.get(&(from, to))
    }

    pub fn delegations(&self) -> impl Iterator<Item = &DelegatedBandwidth> + '_ {
        self.delegations.iter()
    }

    pub fn resources(&self, owner: AccountName) -> Option<&UserResources> {
        self.resources.get(&owner)
    }

    pub fn all_resources(&self) -> impl Iterator<Item = &UserResources> + '_ {
        self.resources.iter()
    }

    pub fn refund(&self, owner: AccountName) -> Option<&RefundRequest> {
        self.refunds.get(&owner)
    }

    pub fn refunds(&self) -> impl Iterator<Item = &RefundRequest> + '_ {
        self.refunds.iter()
    }

    /// Total stake delegated to `beneficiary`, zero if none.
    pub fn delegated_to(&self, beneficiary: AccountName) -> i64 {
        self.resources
            .get(&beneficiary)
            .map(|r| r.net_weight.amount + r.cpu_weight.amount)
            .unwrap_or(0)
    }

    /// Lock `net + cpu` from `payer` as bandwidth for `beneficiary`.
    ///
    /// With `transfer` the row is owned by the beneficiary, who alone may
    /// undelegate it later.
    pub fn delegate(
        &mut self,
        payer: AccountName,
        beneficiary: AccountName,
        net: Asset,
        cpu: Asset,
        transfer: bool,
    ) -> Result<StakeChange, ResourceError> {
        let total = validate_pair(net, cpu)?;
        let owner = if transfer { beneficiary } else { payer };
        let key = (owner, beneficiary);

        if self.delegations.contains(&key) {
            self.delegations.modify(&key, |d| {
                d.net_weight.amount += net.amount;
                d.cpu_weight.amount += cpu.amount;
            })?;
        } else {
            self.delegations.emplace(DelegatedBandwidth {
                from: owner,
                to: beneficiary,
                net_weight: net,
                cpu_weight: cpu,
            })?;
        }

        self.adjust_resources(beneficiary, net.amount, cpu.amount, net.symbol)?;

        tracing::debug!(%payer, %beneficiary, %total, transfer, "bandwidth delegated");
        Ok(StakeChange {
            payer,
            owner,
            beneficiary,
            total,
        })
    }

    /// Unlock stake from the (`owner`, `beneficiary`) row into `owner`'s refund.
    ///
    /// An existing refund request is merged and its timer restarts at `now`.
    pub fn undelegate(
        &mut self,
        owner: AccountName,
        beneficiary: AccountName,
        net: Asset,
        cpu: Asset,
        now: Timestamp,
    ) -> Result<RefundRequest, ResourceError> {
        let total = validate_pair(net, cpu)?;
        let key = (owner, beneficiary);
        let row = self
            .delegations
            .get(&key)
            .ok_or(ResourceError::DelegationNotFound {
                from: owner,
                to: beneficiary,
            })?;
        if row.net_weight.symbol != net.symbol {
            return Err(ResourceError::InvalidAmount("unexpected stake symbol".into()));
        }
        if row.net_weight.amount < net.amount {
            return Err(ResourceError::InsufficientStake {
                resource: "net bandwidth",
                have: row.net_weight,
                requested: net,
            });
        }
        if row.cpu_weight.amount < cpu.amount {
            return Err(ResourceError::InsufficientStake {
                resource: "cpu bandwidth",
                have: row.cpu_weight,
                requested: cpu,
            });
        }

        let emptied = self.delegations.modify(&key, |d| {
            d.net_weight.amount -= net.amount;
            d.cpu_weight.amount -= cpu.amount;
            d.is_empty()
        })?;
        if emptied {
            self.delegations.remove(&key);
        }

        self.adjust_resources(beneficiary, -net.amount, -cpu.amount, net.symbol)?;

        let request = match self.refunds.get(&owner) {
            Some(existing) => {
                let mut merged = existing.clone();
                merged.net_amount.amount += net.amount;
                merged.cpu_amount.amount += cpu.amount;
                merged.request_time = now;
                merged
            }
            None => RefundRequest {
                owner,
                request_time: now,
                net_amount: net,
                cpu_amount: cpu,
            },
        };
        self.refunds.upsert(request.clone());

        tracing::debug!(
            %owner,
            %beneficiary,
            %total,
            release = %request.release_time(),
            "bandwidth undelegated"
        );
        Ok(request)
    }

    /// Release a matured refund, returning the amount to pay out.
    pub fn claim_refund(&mut self, owner: AccountName, now: Timestamp) -> Result<Asset, ResourceError> {
        let request = self
            .refunds
            .get(&owner)
            .ok_or(ResourceError::RefundNotFound(owner))?;
        if now < request.release_time() {
            return Err(ResourceError::RefundNotDue(request.release_time()));
        }
        let total = request
            .total()
            .ok_or_else(|| ResourceError::InvalidAmount("refund amount overflows".into()))?;
        self.refunds.remove(&owner);
        tracing::debug!(%owner, %total, "refund claimed");
        Ok(total)
    }

    pub fn ram_bytes(&self, owner: AccountName) -> i64 {
        self.resources.get(&owner).map(|r| r.ram_bytes).unwrap_or(0)
    }

    /// Add (or with a negative value, remove) RAM quota.
    pub fn adjust_ram(
        &mut self,
        owner: AccountName,
        bytes: i64,
        symbol: Symbol,
    ) -> Result<i64, ResourceError> {
        let current = self.ram_bytes(owner);
        if current + bytes < 0 {
            return Err(ResourceError::InsufficientRam {
                have: current,
                need: -bytes,
            });
        }
        self.ensure_resources(owner, symbol)?;
        Ok(self.resources.modify(&owner, |r| {
            r.ram_bytes += bytes;
            r.ram_bytes
        })?)
    }

    fn ensure_resources(&mut self, owner: AccountName, symbol: Symbol) -> Result<(), ResourceError> {
        if !self.resources.contains(&owner) {
            let zero = Asset::zero(symbol);
            self.resources.emplace(UserResources {
                owner,
                net_weight: zero,
                cpu_weight: zero,
                ram_bytes: 0,
            })?;
        }
        Ok(())
    }

    fn adjust_resources(
        &mut self,
        owner: AccountName,
        net: i64,
        cpu: i64,
        symbol: Symbol,
    ) -> Result<(), ResourceError> {
        self.ensure_resources(owner, symbol)?;
        self.resources.modify(&owner, |r| {
            r.net_weight.amount += net;
            r.cpu_weight.amount += cpu;
        })?;
        Ok(())
    }
}

impl Journaled for DelegationLedger {
    fn begin(&mut self) {
        self.delegations.begin();
        self.resources.begin();
        self.refunds.begin();
    }

    fn commit(&mut self) {
        self.delegations.commit();
        self.resources.commit();
        self.refunds.commit();
    }

    fn rollback(&mut self) {
        self.delegations.rollback();
        self.resources.rollback();
        self.refunds.rollback();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goc_types::ErrorKind;

    const SYS: Symbol = Symbol::from_static(4, "SYS");

    fn sys(amount: i64) -> Asset {
        Asset::new(amount, SYS)
    }

    fn name(s: &str) -> AccountName {
        s.parse().unwrap()
    }

    #[test]
    fn delegate_accumulates_and_tracks_beneficiary() {
        let mut ledger = DelegationLedger::new();
        let change = ledger
            .delegate(name("alice"), name("bob"), sys(10), sys(5), false)
            .unwrap();
        assert_eq!(change.owner, name("alice"));
        assert_eq!(change.total, sys(15));
        ledger
            .delegate(name("alice"), name("bob"), sys(1), sys(0), false)
            .unwrap();
        let row = ledger.delegation(name("alice"), name("bob")).unwrap();
        assert_eq!(row.net_weight, sys(11));
        assert_eq!(ledger.delegated_to(name("bob")), 16);
    }

    #[test]
    fn transfer_gives_row_to_beneficiary() {
        let mut ledger = DelegationLedger::new();
        let change = ledger
            .delegate(name("alice"), name("bob"), sys(10), sys(10), true)
            .unwrap();
        assert_eq!(change.owner, name("bob"));
        assert!(ledger.delegation(name("alice"), name("bob")).is_none());
        assert!(ledger.delegation(name("bob"), name("bob")).is_some());
    }

    #[test]
    fn rejects_bad_amounts() {
        let mut ledger = DelegationLedger::new();
        let err = ledger
            .delegate(name("alice"), name("bob"), sys(0), sys(0), false)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAmount);
        let err = ledger
            .delegate(name("alice"), name("bob"), sys(-1), sys(5), false)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAmount);
        let other = Asset::new(5, Symbol::from_static(4, "GOC"));
        let err = ledger
            .delegate(name("alice"), name("bob"), sys(5), other, false)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAmount);
    }

    #[test]
    fn undelegate_merges_refunds_and_resets_timer() {
        let mut ledger = DelegationLedger::new();
        ledger
            .delegate(name("alice"), name("alice"), sys(100), sys(100), false)
            .unwrap();

        ledger
            .undelegate(name("alice"), name("alice"), sys(50), sys(0), Timestamp::new(1_000))
            .unwrap();
        let refund = ledger
            .undelegate(name("alice"), name("alice"), sys(30), sys(0), Timestamp::new(2_000))
            .unwrap();

        assert_eq!(refund.net_amount, sys(80));
        assert_eq!(refund.release_time(), Timestamp::new(2_000 + REFUND_DELAY_SECS));
        assert_eq!(ledger.refunds().count(), 1);
        assert_eq!(ledger.delegated_to(name("alice")), 120);
    }

    #[test]
    fn undelegate_checks_balances() {
        let mut ledger = DelegationLedger::new();
        let err = ledger
            .undelegate(name("alice"), name("bob"), sys(1), sys(0), Timestamp::EPOCH)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        ledger
            .delegate(name("alice"), name("bob"), sys(10), sys(10), false)
            .unwrap();
        let err = ledger
            .undelegate(name("alice"), name("bob"), sys(11), sys(0), Timestamp::EPOCH)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientBalance);
    }

    #[test]
    fn emptied_row_is_deleted() {
        let mut ledger = DelegationLedger::new();
        ledger
            .delegate(name("alice"), name("bob"), sys(10), sys(10), false)
            .unwrap();
        ledger
            .undelegate(name("alice"), name("bob"), sys(10), sys(10), Timestamp::EPOCH)
            .unwrap();
        assert!(ledger.delegation(name("alice"), name("bob")).is_none());
    }

    #[test]
    fn refund_only_after_delay() {
        let mut ledger = DelegationLedger::new();
        ledger
            .delegate(name("alice"), name("alice"), sys(10), sys(0), false)
            .unwrap();
        ledger
            .undelegate(name("alice"), name("alice"), sys(10), sys(0), Timestamp::new(100))
            .unwrap();

        let early = Timestamp::new(100 + REFUND_DELAY_SECS - 1);
        assert_eq!(
            ledger.claim_refund(name("alice"), early).unwrap_err().kind(),
            ErrorKind::OutOfWindow
        );
        let due = Timestamp::new(100 + REFUND_DELAY_SECS);
        assert_eq!(ledger.claim_refund(name("alice"), due).unwrap(), sys(10));
        assert_eq!(
            ledger.claim_refund(name("alice"), due).unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn rollback_restores_all_tables() {
        let mut ledger = DelegationLedger::new();
        ledger
            .delegate(name("alice"), name("bob"), sys(10), sys(10), false)
            .unwrap();
        ledger.begin();
        ledger
            .undelegate(name("alice"), name("bob"), sys(10), sys(10), Timestamp::EPOCH)
            .unwrap();
        ledger.rollback();
        assert!(ledger.delegation(name("alice"), name("bob")).is_some());
        assert!(ledger.refund(name("alice")).is_none());
        assert_eq!(ledger.delegated_to(name("bob")), 20);
    }

    #[test]
    fn ram_quota_cannot_go_negative() {
        let mut ledger = DelegationLedger::new();
        assert_eq!(ledger.adjust_ram(name("alice"), 100, SYS).unwrap(), 100);
        assert_eq!(
            ledger.adjust_ram(name("alice"), -101, SYS).unwrap_err().kind(),
            ErrorKind::InsufficientBalance
        );
    }
}
