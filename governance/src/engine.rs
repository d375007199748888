//! Governance engine: moves proposals through their vote windows to settlement.
//!
//! The engine only keeps governance state and bucket accounting in
//! [`GlobalState`]. Token movements (fee escrow, action fees, refunds, reward
//! payouts) are returned to the caller, which turns them into transfers.

use std::collections::BTreeMap;

use goc_store::{Journaled, Table};
use goc_types::{AccountName, Asset, GlobalState, Timestamp};
use goc_voting::{Election, ProducerInfo, ProducerRegistry, VoterRegistry, VotingError};
use serde::{Deserialize, Serialize};

use crate::error::GocError;
use crate::proposal::{validate_text, ByEndTime, GocProposal, StartMode, VoteWindows};
use crate::reward::GocReward;
use crate::vote::{ballots_of, bp_score, BpVote, GocVote};

/// A proposal submission.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewProposal {
    pub owner: AccountName,
    pub fee: Asset,
    pub name: String,
    pub content: String,
    pub url: String,
    #[serde(default)]
    pub start_mode: StartMode,
}

/// Outcome of settling one proposal.
#[derive(Clone, Debug, PartialEq)]
pub struct Settlement {
    pub id: u64,
    pub owner: AccountName,
    pub passed: bool,
    /// Credited to the owner's pending rewards; zero when rejected.
    pub reward: Asset,
    /// The escrowed fee to hand back, if the proposal passed.
    pub fee_refund: Option<Asset>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GocEngine {
    proposals: Table<GocProposal, ByEndTime>,
    votes: Table<GocVote>,
    bp_votes: Table<BpVote>,
    rewards: Table<GocReward>,
}

impl GocEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn proposal(&self, id: u64) -> Option<&GocProposal> {
        self.proposals.get(&id)
    }

    pub fn require(&self, id: u64) -> Result<&GocProposal, GocError> {
        self.proposals.get(&id).ok_or(GocError::ProposalNotFound(id))
    }

    pub fn proposals(&self) -> impl Iterator<Item = &GocProposal> + '_ {
        self.proposals.iter()
    }

    pub fn vote(&self, id: u64, owner: AccountName) -> Option<&GocVote> {
        self.votes.get(&(id, owner))
    }

    pub fn votes_on(&self, id: u64) -> impl Iterator<Item = &GocVote> + '_ {
        self.votes.range(ballots_of(id))
    }

    pub fn bp_vote(&self, id: u64, owner: AccountName) -> Option<&BpVote> {
        self.bp_votes.get(&(id, owner))
    }

    pub fn bp_votes_on(&self, id: u64) -> impl Iterator<Item = &BpVote> + '_ {
        self.bp_votes.range(ballots_of(id))
    }

    pub fn rewards_of(&self, owner: AccountName) -> impl Iterator<Item = &GocReward> + '_ {
        self.rewards.range((owner, 0)..=(owner, u64::MAX))
    }

    pub fn has_open_proposal(&self, owner: AccountName) -> bool {
        self.proposals
            .iter()
            .any(|p| p.owner == owner && !p.is_settled())
    }

    /// Submit a proposal. The caller escrows `fee` from the owner.
    pub fn propose(
        &mut self,
        global: &GlobalState,
        voters: &VoterRegistry,
        req: NewProposal,
        now: Timestamp,
    ) -> Result<u64, GocError> {
        if !req.fee.is_positive() || !req.fee.is_valid() {
            return Err(GocError::InvalidFee(req.fee));
        }
        if req.fee.amount > global.goc_proposal_fee_limit {
            return Err(GocError::FeeTooHigh {
                fee: req.fee,
                limit: global.goc_proposal_fee_limit,
            });
        }
        let staked = voters.get(&req.owner).map(|v| v.staked).unwrap_or(0);
        if staked < global.goc_stake_limit {
            return Err(GocError::InsufficientStake {
                owner: req.owner,
                staked,
                required: global.goc_stake_limit,
            });
        }
        validate_text(&req.name, &req.content, &req.url)?;

        let windows = VoteWindows::plan(now, req.start_mode, global);
        let id = self.proposals.available_primary_key();
        self.proposals.emplace(GocProposal {
            id,
            owner: req.owner,
            fee: req.fee,
            proposal_name: req.name,
            proposal_content: req.content,
            url: req.url,
            create_time: now,
            vote_starttime: windows.vote_starttime,
            bp_vote_starttime: windows.bp_vote_starttime,
            bp_vote_endtime: windows.bp_vote_endtime,
            settle_time: Timestamp::EPOCH,
            reward: Asset::zero(req.fee.symbol),
            total_yeas: 0.0,
            total_nays: 0.0,
            total_voter: 0,
            bp_nays: 0.0,
            total_bp: 0,
            passed: false,
        })?;
        tracing::info!(
            id,
            owner = %req.owner,
            fee = %req.fee,
            mode = ?req.start_mode,
            vote_start = %windows.vote_starttime,
            "proposal created"
        );
        Ok(id)
    }

    /// Edit a proposal's text before account voting opens.
    pub fn update(
        &mut self,
        owner: AccountName,
        id: u64,
        name: String,
        content: String,
        url: String,
        now: Timestamp,
    ) -> Result<(), GocError> {
        let proposal = self.require(id)?;
        if proposal.owner != owner {
            return Err(GocError::NotOwner(id));
        }
        if now >= proposal.vote_starttime {
            return Err(proposal.window_error(now, proposal.create_time, proposal.vote_starttime));
        }
        validate_text(&name, &content, &url)?;
        self.proposals.modify(&id, |p| {
            p.proposal_name = name;
            p.proposal_content = content;
            p.url = url;
        })?;
        tracing::debug!(id, %owner, "proposal updated");
        Ok(())
    }

    /// Cast or change an account vote, returning the action fee charged.
    ///
    /// The fee is credited to the voter bucket; the caller collects it.
    pub fn vote_on(
        &mut self,
        global: &mut GlobalState,
        voters: &VoterRegistry,
        voter: AccountName,
        id: u64,
        yea: bool,
        now: Timestamp,
    ) -> Result<i64, GocError> {
        let proposal = self.require(id)?;
        if proposal.is_settled() {
            return Err(GocError::AlreadySettled(id));
        }
        if now < proposal.vote_starttime || now >= proposal.bp_vote_starttime {
            return Err(proposal.window_error(now, proposal.vote_starttime, proposal.bp_vote_starttime));
        }
        let staked = voters.get(&voter).map(|v| v.staked).unwrap_or(0);
        if staked <= 0 {
            return Err(GocError::NoStake(voter));
        }
        let weight = voters.engine().weight(staked, now);

        let previous = self.votes.get(&(id, voter)).map(|v| (v.vote, v.weight));
        self.proposals.modify(&id, |p| {
            match previous {
                Some((true, w)) => p.total_yeas -= w,
                Some((false, w)) => p.total_nays -= w,
                None => p.total_voter += 1,
            }
            if yea {
                p.total_yeas += weight;
            } else {
                p.total_nays += weight;
            }
        })?;
        match previous {
            Some(_) => {
                self.votes.modify(&(id, voter), |v| {
                    v.vote = yea;
                    v.weight = weight;
                    v.vote_update_time = now;
                })?;
            }
            None => {
                self.votes.emplace(GocVote {
                    proposal_id: id,
                    owner: voter,
                    vote: yea,
                    vote_time: now,
                    vote_update_time: now,
                    settle_time: Timestamp::EPOCH,
                    weight,
                })?;
            }
        }

        let fee = global.goc_action_fee;
        global.goc_voter_bucket += fee;
        tracing::debug!(id, %voter, yea, weight, revote = previous.is_some(), "account vote");
        Ok(fee)
    }

    /// Cast or change an elected producer's ratification vote.
    pub fn bp_vote_on(
        &mut self,
        election: &Election,
        producers: &ProducerRegistry,
        producer: AccountName,
        id: u64,
        yea: bool,
        now: Timestamp,
    ) -> Result<(), GocError> {
        let proposal = self.require(id)?;
        if proposal.is_settled() {
            return Err(GocError::AlreadySettled(id));
        }
        if now < proposal.bp_vote_starttime || now >= proposal.bp_vote_endtime {
            return Err(proposal.window_error(now, proposal.bp_vote_starttime, proposal.bp_vote_endtime));
        }
        if !election.is_elected(&producer) {
            return Err(GocError::NotElected(producer));
        }
        if !producers.get(&producer).is_some_and(ProducerInfo::active) {
            return Err(VotingError::ProducerInactive(producer).into());
        }

        let previous = self.bp_votes.get(&(id, producer)).map(BpVote::score);
        self.proposals.modify(&id, |p| {
            match previous {
                Some(score) => p.bp_nays -= score,
                None => p.total_bp = p.total_bp.saturating_add(1),
            }
            p.bp_nays += bp_score(yea);
        })?;
        match previous {
            Some(_) => {
                self.bp_votes.modify(&(id, producer), |v| {
                    v.vote = yea;
                    v.vote_update_time = now;
                })?;
            }
            None => {
                self.bp_votes.emplace(BpVote {
                    proposal_id: id,
                    owner: producer,
                    vote: yea,
                    vote_time: now,
                    vote_update_time: now,
                    settle_time: Timestamp::EPOCH,
                })?;
            }
        }
        tracing::debug!(id, %producer, yea, "producer vote");
        Ok(())
    }

    /// Settle a proposal whose producer-vote window has closed.
    ///
    /// A passing proposal earns `min(max_proposal_reward, voter bucket)` and
    /// gets its fee back; a failing one forfeits its fee to the voter bucket.
    pub fn settle(
        &mut self,
        global: &mut GlobalState,
        id: u64,
        now: Timestamp,
    ) -> Result<Settlement, GocError> {
        let proposal = self.require(id)?;
        if proposal.is_settled() {
            return Err(GocError::AlreadySettled(id));
        }
        if now < proposal.bp_vote_endtime {
            return Err(proposal.window_error(now, proposal.bp_vote_endtime, Timestamp::new(u64::MAX)));
        }

        let owner = proposal.owner;
        let fee = proposal.fee;
        let passed = proposal.vote_pass() && proposal.bp_pass(global.goc_bp_nay_threshold);
        let reward_amount = if passed {
            global
                .goc_max_proposal_reward
                .min(global.goc_voter_bucket)
                .max(0)
        } else {
            0
        };
        let reward = Asset::new(reward_amount, fee.symbol);

        if passed {
            global.goc_voter_bucket -= reward_amount;
            if reward_amount > 0 {
                self.rewards.emplace(GocReward {
                    owner,
                    proposal_id: id,
                    reward_time: now,
                    rewards: reward,
                })?;
            }
        } else {
            global.goc_voter_bucket += fee.amount;
        }

        self.proposals.modify(&id, |p| {
            p.settle_time = now;
            p.reward = reward;
            p.passed = passed;
        })?;
        self.close_ballots(id, now)?;

        tracing::info!(id, %owner, passed, %reward, "proposal settled");
        Ok(Settlement {
            id,
            owner,
            passed,
            reward,
            fee_refund: passed.then_some(fee),
        })
    }

    fn close_ballots(&mut self, id: u64, now: Timestamp) -> Result<(), GocError> {
        let votes: Vec<_> = self.votes.range(ballots_of(id)).map(|v| (v.proposal_id, v.owner)).collect();
        for key in votes {
            self.votes.modify(&key, |v| v.settle_time = now)?;
        }
        let bp_votes: Vec<_> = self
            .bp_votes
            .range(ballots_of(id))
            .map(|v| (v.proposal_id, v.owner))
            .collect();
        for key in bp_votes {
            self.bp_votes.modify(&key, |v| v.settle_time = now)?;
        }
        Ok(())
    }

    /// Unsettled proposals whose producer-vote window has ended, earliest first.
    pub fn due_for_settlement(&self, now: Timestamp, limit: usize) -> Vec<u64> {
        self.proposals
            .iter_by_index()
            .take_while(|p| !p.is_settled() && p.bp_vote_endtime <= now)
            .take(limit)
            .map(|p| p.id)
            .collect()
    }

    /// Remove and return every pending reward of `owner`.
    pub fn claim(&mut self, owner: AccountName) -> Result<Asset, GocError> {
        let pending: Vec<GocReward> = self.rewards_of(owner).cloned().collect();
        let Some(first) = pending.first() else {
            return Err(GocError::NothingToClaim(owner));
        };
        let total = pending.iter().try_fold(Asset::zero(first.rewards.symbol), |acc, r| {
            acc.checked_add(r.rewards)
                .ok_or(GocError::Overflow("claimed reward total"))
        })?;
        for reward in &pending {
            self.rewards.remove(&(owner, reward.proposal_id));
        }
        tracing::info!(%owner, %total, proposals = pending.len(), "governance reward claimed");
        Ok(total)
    }

    /// Drain the gn bucket if the drain interval has passed.
    ///
    /// The balance is split by how many producer votes each producer cast on
    /// proposals settled in `[previous drain, now)`. A proposal settled at the
    /// drain instant counts toward the next drain. Rounding dust stays in the
    /// bucket. Returns `None` when not yet due.
    pub fn drain_gn_bucket(
        &mut self,
        global: &mut GlobalState,
        now: Timestamp,
    ) -> Option<Vec<(AccountName, i64)>> {
        let last = global.last_gn_bucket_empty;
        if !last.has_expired(global.goc_gn_drain_interval, now) {
            return None;
        }
        global.last_gn_bucket_empty = now;

        let mut counts: BTreeMap<AccountName, u64> = BTreeMap::new();
        for vote in self.bp_votes.iter() {
            let settled = vote.settle_time != Timestamp::EPOCH;
            if settled && vote.settle_time >= last && vote.settle_time < now {
                *counts.entry(vote.owner).or_default() += 1;
            }
        }
        let total: u64 = counts.values().sum();
        let bucket = global.goc_gn_bucket;
        if total == 0 || bucket <= 0 {
            return Some(Vec::new());
        }

        let payouts: Vec<(AccountName, i64)> = counts
            .into_iter()
            .filter_map(|(owner, n)| {
                let share = i128::from(bucket) * i128::from(n) / i128::from(total);
                let share = i64::try_from(share).ok()?;
                (share > 0).then_some((owner, share))
            })
            .collect();
        let paid: i64 = payouts.iter().map(|(_, amount)| amount).sum();
        global.goc_gn_bucket -= paid;
        tracing::info!(producers = payouts.len(), paid, left = global.goc_gn_bucket, "gn bucket drained");
        Some(payouts)
    }
}

impl Journaled for GocEngine {
    fn begin(&mut self) {
        self.proposals.begin();
        self.votes.begin();
        self.bp_votes.begin();
        self.rewards.begin();
    }

    fn commit(&mut self) {
        self.proposals.commit();
        self.votes.commit();
        self.bp_votes.commit();
        self.rewards.commit();
    }

    fn rollback(&mut self) {
        self.proposals.rollback();
        self.votes.rollback();
        self.bp_votes.rollback();
        self.rewards.rollback();
    }
}
