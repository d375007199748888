//! Staked bandwidth, refunds and governance staking.

use goc_host::{DeferredAction, DeferredKey, DeferredTask, Effect};
use goc_types::{AccountName, Asset};

use crate::accounts::STAKE_ACCOUNT;
use crate::contract::ActionCtx;
use crate::SystemError;

impl ActionCtx<'_> {
    pub(crate) fn delegatebw(
        &mut self,
        from: AccountName,
        receiver: AccountName,
        net: Asset,
        cpu: Asset,
        transfer: bool,
    ) -> Result<(), SystemError> {
        self.require_core(net)?;
        self.require_core(cpu)?;
        self.require_account(receiver)?;
        if transfer && from == receiver {
            return Err(SystemError::InvalidArgument(
                "cannot use transfer flag if delegating to self".into(),
            ));
        }

        let now = self.now;
        let change = self.state.ledger.delegate(from, receiver, net, cpu, transfer)?;
        self.effects
            .transfer(change.payer, STAKE_ACCOUNT, change.total, "stake bandwidth");
        self.state.voters.update_voting_power(
            &mut self.state.producers,
            &mut self.state.global,
            receiver,
            change.total.amount,
            now,
        )?;
        self.sync_limits(receiver);
        Ok(())
    }

    pub(crate) fn undelegatebw(
        &mut self,
        from: AccountName,
        receiver: AccountName,
        net: Asset,
        cpu: Asset,
    ) -> Result<(), SystemError> {
        if !self.state.global.is_activated() {
            return Err(SystemError::NotActivated("unstake"));
        }
        self.require_core(net)?;
        self.require_core(cpu)?;
        self.check_goc_lock(from, receiver, net.amount.saturating_add(cpu.amount))?;

        let now = self.now;
        let request = self.state.ledger.undelegate(from, receiver, net, cpu, now)?;
        self.state.voters.update_voting_power(
            &mut self.state.producers,
            &mut self.state.global,
            receiver,
            -(net.amount + cpu.amount),
            now,
        )?;
        self.effects.schedule(DeferredTask {
            action: DeferredAction::Refund { owner: from },
            execute_at: request.release_time(),
        });
        self.sync_limits(receiver);
        Ok(())
    }

    pub(crate) fn refund(&mut self, owner: AccountName) -> Result<(), SystemError> {
        let amount = self.state.ledger.claim_refund(owner, self.now)?;
        if amount.is_positive() {
            self.effects.transfer(STAKE_ACCOUNT, owner, amount, "unstake");
        }
        self.effects.push(Effect::Cancel(DeferredKey::Refund(owner)));
        Ok(())
    }

    pub(crate) fn gocstake(&mut self, payer: AccountName) -> Result<(), SystemError> {
        let split = self.state.goc.plan_stake(
            &self.state.global,
            &self.state.voters,
            payer,
            self.core_symbol(),
        )?;
        self.delegatebw(payer, payer, split.net, split.cpu, false)?;
        self.state.voters.add_goc_staked(payer, split.total())?;
        tracing::info!(%payer, staked = split.total(), "governance stake locked");
        Ok(())
    }

    pub(crate) fn gocunstake(&mut self, receiver: AccountName) -> Result<(), SystemError> {
        let split = self
            .state
            .goc
            .plan_unstake(&self.state.voters, receiver, self.core_symbol())?;
        self.state.voters.add_goc_staked(receiver, -split.total())?;
        self.undelegatebw(receiver, receiver, split.net, split.cpu)?;
        tracing::info!(%receiver, released = split.total(), "governance stake released");
        Ok(())
    }

    /// Self-delegated stake below the governance stake cannot be undelegated
    /// directly.
    fn check_goc_lock(&self, from: AccountName, receiver: AccountName, requested: i64) -> Result<(), SystemError> {
        if from != receiver {
            return Ok(());
        }
        let locked = self.state.voters.get(&from).map(|v| v.goc_staked).unwrap_or(0);
        if locked <= 0 {
            return Ok(());
        }
        let delegated = self
            .state
            .ledger
            .delegation(from, from)
            .map(|d| d.net_weight.amount + d.cpu_weight.amount)
            .unwrap_or(0);
        if delegated - requested < locked {
            return Err(SystemError::GovernanceStakeLocked {
                owner: from,
                requested,
                locked,
            });
        }
        Ok(())
    }
}
