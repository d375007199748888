//! Governance staking: the self-delegation that makes an account eligible
//! to propose.

use goc_types::{AccountName, Asset, GlobalState, Symbol};
use goc_voting::VoterRegistry;

use crate::engine::GocEngine;
use crate::error::GocError;

/// How a governance stake is split between bandwidth resources.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StakeSplit {
    pub net: Asset,
    pub cpu: Asset,
}

impl StakeSplit {
    /// Half to net, the remainder to cpu.
    pub fn of(amount: i64, symbol: Symbol) -> Self {
        let net = amount / 2;
        Self {
            net: Asset::new(net, symbol),
            cpu: Asset::new(amount - net, symbol),
        }
    }

    pub fn total(&self) -> i64 {
        self.net.amount + self.cpu.amount
    }
}

impl GocEngine {
    /// The stake `payer` has to lock to become eligible.
    pub fn plan_stake(
        &self,
        global: &GlobalState,
        voters: &VoterRegistry,
        payer: AccountName,
        symbol: Symbol,
    ) -> Result<StakeSplit, GocError> {
        if voters.get(&payer).is_some_and(|v| v.goc_staked > 0) {
            return Err(GocError::AlreadyStaked(payer));
        }
        if global.goc_stake_limit <= 0 {
            return Err(GocError::InvalidFee(Asset::new(global.goc_stake_limit, symbol)));
        }
        Ok(StakeSplit::of(global.goc_stake_limit, symbol))
    }

    /// The stake `receiver` gets back. Refused while it owns an unsettled proposal.
    pub fn plan_unstake(
        &self,
        voters: &VoterRegistry,
        receiver: AccountName,
        symbol: Symbol,
    ) -> Result<StakeSplit, GocError> {
        let staked = voters.get(&receiver).map(|v| v.goc_staked).unwrap_or(0);
        if staked <= 0 {
            return Err(GocError::NotStaked(receiver));
        }
        if self.has_open_proposal(receiver) {
            return Err(GocError::OpenProposal(receiver));
        }
        Ok(StakeSplit::of(staked, symbol))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goc_types::{ErrorKind, Timestamp};
    use goc_voting::ProducerRegistry;

    const SYS: Symbol = Symbol::from_static(4, "SYS");

    #[test]
    fn odd_stakes_put_the_extra_unit_on_cpu() {
        let split = StakeSplit::of(1_000_000_001, SYS);
        assert_eq!(split.net.amount, 500_000_000);
        assert_eq!(split.cpu.amount, 500_000_001);
        assert_eq!(split.total(), 1_000_000_001);
    }

    #[test]
    fn stake_once_then_unstake() {
        let alice = AccountName::from_static("alice");
        let mut global = GlobalState::default();
        let mut voters = VoterRegistry::new();
        let mut producers = ProducerRegistry::new();
        let engine = GocEngine::new();

        assert_eq!(
            engine.plan_unstake(&voters, alice, SYS).unwrap_err().kind(),
            ErrorKind::InsufficientBalance
        );

        let split = engine.plan_stake(&global, &voters, alice, SYS).unwrap();
        assert_eq!(split.total(), global.goc_stake_limit);

        voters
            .update_voting_power(&mut producers, &mut global, alice, split.total(), Timestamp::new(10))
            .unwrap();
        voters.add_goc_staked(alice, split.total()).unwrap();
        assert!(matches!(
            engine.plan_stake(&global, &voters, alice, SYS),
            Err(GocError::AlreadyStaked(_))
        ));
        assert_eq!(engine.plan_unstake(&voters, alice, SYS).unwrap(), split);
    }
}
