//! Governance actions. Fees and rewards move through the governance account.

use goc_governance::NewProposal;
use goc_types::{AccountName, Asset};

use crate::accounts::GOC_ACCOUNT;
use crate::contract::ActionCtx;
use crate::SystemError;

impl ActionCtx<'_> {
    pub(crate) fn gocnewprop(&mut self, proposal: NewProposal) -> Result<(), SystemError> {
        if proposal.start_mode.is_debug() && !self.config.allow_debug_start_modes {
            return Err(SystemError::DebugStartMode(proposal.start_mode));
        }
        self.require_core(proposal.fee)?;
        let (owner, fee) = (proposal.owner, proposal.fee);
        let now = self.now;
        let id = self
            .state
            .goc
            .propose(&self.state.global, &self.state.voters, proposal, now)?;
        self.effects.transfer(owner, GOC_ACCOUNT, fee, "proposal fee");
        tracing::debug!(id, %owner, "proposal fee escrowed");
        Ok(())
    }

    pub(crate) fn gocupprop(
        &mut self,
        owner: AccountName,
        id: u64,
        name: String,
        content: String,
        url: String,
    ) -> Result<(), SystemError> {
        self.state.goc.update(owner, id, name, content, url, self.now)?;
        Ok(())
    }

    pub(crate) fn gocvote(&mut self, voter: AccountName, id: u64, yea: bool) -> Result<(), SystemError> {
        let now = self.now;
        let fee = self.state.goc.vote_on(
            &mut self.state.global,
            &self.state.voters,
            voter,
            id,
            yea,
            now,
        )?;
        if fee > 0 {
            self.effects
                .transfer(voter, GOC_ACCOUNT, Asset::new(fee, self.core_symbol()), "governance action fee");
        }
        Ok(())
    }

    pub(crate) fn gocbpvote(&mut self, bp: AccountName, id: u64, yea: bool) -> Result<(), SystemError> {
        self.state
            .goc
            .bp_vote_on(&self.state.election, &self.state.producers, bp, id, yea, self.now)?;
        Ok(())
    }

    pub(crate) fn gocsettle(&mut self, caller: AccountName, id: u64) -> Result<(), SystemError> {
        let owner = self.state.goc.require(id)?.owner;
        if caller != owner && caller != self.config.system_account {
            return Err(SystemError::MissingAuthority {
                required: owner,
                signer: caller,
            });
        }
        let now = self.now;
        let settlement = self.state.goc.settle(&mut self.state.global, id, now)?;
        if let Some(fee) = settlement.fee_refund {
            self.effects.transfer(GOC_ACCOUNT, owner, fee, "proposal fee refund");
        }
        Ok(())
    }

    pub(crate) fn gocclaim(&mut self, owner: AccountName) -> Result<(), SystemError> {
        let total = self.state.goc.claim(owner)?;
        if total.is_positive() {
            self.effects.transfer(GOC_ACCOUNT, owner, total, "proposal reward");
        }
        Ok(())
    }
}
