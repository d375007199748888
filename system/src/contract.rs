//! The system contract and its transactional action runner.

use goc_host::{DeferredAction, DeferredTask, Effect, Effects, Host};
use goc_store::Journaled;
use goc_types::{AccountName, Asset, Symbol, Timestamp};

use crate::action::{Action, Authority};
use crate::config::SystemConfig;
use crate::state::SystemState;
use crate::SystemError;

/// The system contract.
///
/// Every action runs inside a checkpoint over [`SystemState`]. Collaborator
/// effects are journaled while it runs and handed to the [`Host`] only once
/// the action has succeeded; a failure anywhere, including in the host,
/// leaves the state exactly as it was.
pub struct SystemContract {
    config: SystemConfig,
    host: Host,
    state: SystemState,
}

impl SystemContract {
    /// A contract over a fresh chain.
    pub fn new(config: SystemConfig, host: Host) -> Result<Self, SystemError> {
        config.validate()?;
        let state = SystemState::genesis(&config);
        Ok(Self {
            config,
            host,
            state,
        })
    }

    /// A contract resuming from previously saved state.
    pub fn from_state(config: SystemConfig, host: Host, state: SystemState) -> Result<Self, SystemError> {
        config.validate()?;
        Ok(Self {
            config,
            host,
            state,
        })
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    pub fn state(&self) -> &SystemState {
        &self.state
    }

    pub fn into_state(self) -> SystemState {
        self.state
    }

    /// Run `action` signed by `signer` at `now`.
    ///
    /// Returns the effects committed to the host.
    pub fn apply(&mut self, signer: AccountName, action: Action, now: Timestamp) -> Result<Effects, SystemError> {
        let name = action.name();
        if let Err(e) = self.authorize(signer, &action) {
            tracing::warn!(action = name, %signer, kind = %e.kind(), error = %e, "action rejected");
            return Err(e);
        }

        self.state.begin();
        let result = self.execute(action, now).and_then(|effects| {
            self.host.commit(effects.clone())?;
            Ok(effects)
        });
        match result {
            Ok(effects) => {
                self.state.commit();
                tracing::debug!(action = name, %signer, effects = effects.len(), "action applied");
                Ok(effects)
            }
            Err(e) => {
                self.state.rollback();
                tracing::warn!(action = name, %signer, kind = %e.kind(), error = %e, "action rejected");
                Err(e)
            }
        }
    }

    /// Execute every deferred task due at `now`, earliest first.
    pub fn run_deferred(&mut self, now: Timestamp) -> Vec<(DeferredTask, Result<Effects, SystemError>)> {
        let due = self.host.deferred.take_due(now);
        due.into_iter()
            .map(|task| {
                let (signer, action) = match task.action {
                    DeferredAction::Refund { owner } => (owner, Action::Refund { owner }),
                    DeferredAction::BidRefund { bidder, newname } => {
                        (bidder, Action::BidRefund { bidder, newname })
                    }
                };
                let result = self.apply(signer, action, now);
                (task, result)
            })
            .collect()
    }

    fn authorize(&self, signer: AccountName, action: &Action) -> Result<(), SystemError> {
        let required = match action.authority() {
            Authority::System => self.config.system_account,
            Authority::Account(account) => account,
        };
        if signer != required {
            return Err(SystemError::MissingAuthority { required, signer });
        }
        Ok(())
    }

    fn execute(&mut self, action: Action, now: Timestamp) -> Result<Effects, SystemError> {
        let now = match &action {
            Action::OnBlock { timestamp, .. } => timestamp.to_timestamp(),
            _ => now,
        };
        let mut ctx = ActionCtx {
            config: &self.config,
            host: &self.host,
            state: &mut self.state,
            effects: Effects::new(),
            now,
        };
        ctx.dispatch(action)?;
        Ok(ctx.effects)
    }
}

impl std::fmt::Debug for SystemContract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemContract")
            .field("system_account", &self.config.system_account)
            .field("core_symbol", &self.config.core_symbol)
            .finish_non_exhaustive()
    }
}

/// Everything one action may touch while it runs.
pub(crate) struct ActionCtx<'a> {
    pub config: &'a SystemConfig,
    pub host: &'a Host,
    pub state: &'a mut SystemState,
    pub effects: Effects,
    pub now: Timestamp,
}

impl ActionCtx<'_> {
    fn dispatch(&mut self, action: Action) -> Result<(), SystemError> {
        match action {
            Action::OnBlock {
                timestamp,
                producer,
            } => self.onblock(timestamp, producer),
            Action::DelegateBw {
                from,
                receiver,
                stake_net_quantity,
                stake_cpu_quantity,
                transfer,
            } => self.delegatebw(from, receiver, stake_net_quantity, stake_cpu_quantity, transfer),
            Action::UndelegateBw {
                from,
                receiver,
                unstake_net_quantity,
                unstake_cpu_quantity,
            } => self.undelegatebw(from, receiver, unstake_net_quantity, unstake_cpu_quantity),
            Action::Refund { owner } => self.refund(owner),
            Action::BuyRam {
                payer,
                receiver,
                quant,
            } => self.buyram(payer, receiver, quant),
            Action::BuyRamBytes {
                payer,
                receiver,
                bytes,
            } => self.buyrambytes(payer, receiver, bytes),
            Action::SellRam { account, bytes } => self.sellram(account, bytes),
            Action::RegProducer {
                producer,
                producer_key,
                url,
                location,
            } => self.regproducer(producer, producer_key, &url, location),
            Action::UnregProd { producer } | Action::RmvProducer { producer } => {
                self.unregprod(producer)
            }
            Action::SetRam { max_ram_size } => self.setram(max_ram_size),
            Action::VoteProducer {
                voter,
                proxy,
                producers,
            } => self.voteproducer(voter, proxy, &producers),
            Action::RegProxy { proxy, isproxy } => self.regproxy(proxy, isproxy),
            Action::SetParams { params } => self.setparams(params),
            Action::SetGocParams { params } => self.setgocparams(params),
            Action::ClaimRewards { owner } => self.claimrewards(owner),
            Action::SetPriv { account, is_priv } => self.setpriv(account, is_priv),
            Action::BidName {
                bidder,
                newname,
                bid,
            } => self.bidname(bidder, newname, bid),
            Action::BidRefund { bidder, newname } => self.bidrefund(bidder, newname),
            Action::ClaimName {
                claimer,
                newname,
                key,
            } => self.claimname(claimer, newname, key),
            Action::GocStake { payer } => self.gocstake(payer),
            Action::GocUnstake { receiver } => self.gocunstake(receiver),
            action @ Action::GocNewProp { .. } => match action.into_proposal() {
                Some(proposal) => self.gocnewprop(proposal),
                None => Err(SystemError::InvalidArgument("not a proposal".into())),
            },
            Action::GocUpProp {
                owner,
                id,
                proposal_name,
                proposal_content,
                url,
            } => self.gocupprop(owner, id, proposal_name, proposal_content, url),
            Action::GocVote { voter, id, yea } => self.gocvote(voter, id, yea),
            Action::GocBpVote { bp, id, yea } => self.gocbpvote(bp, id, yea),
            Action::GocSettle { caller, id } => self.gocsettle(caller, id),
            Action::GocClaim { owner } => self.gocclaim(owner),
        }
    }

    pub fn core_symbol(&self) -> Symbol {
        self.config.core_symbol
    }

    pub fn require_core(&self, quantity: Asset) -> Result<(), SystemError> {
        if quantity.symbol != self.config.core_symbol {
            return Err(SystemError::WrongSymbol {
                expected: self.config.core_symbol,
                got: quantity,
            });
        }
        Ok(())
    }

    pub fn require_account(&self, account: AccountName) -> Result<(), SystemError> {
        if !self.host.accounts.exists(account) {
            return Err(goc_host::HostError::UnknownAccount(account).into());
        }
        Ok(())
    }

    /// Forward `account`'s current resource totals to the host.
    pub fn sync_limits(&mut self, account: AccountName) {
        if let Some(r) = self.state.ledger.resources(account) {
            self.effects.push(Effect::SetResourceLimits {
                account,
                ram_bytes: r.ram_bytes,
                net_weight: r.net_weight.amount,
                cpu_weight: r.cpu_weight.amount,
            });
        }
    }
}
