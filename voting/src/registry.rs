//! Voter registry: vote updates, proxy registration and weight propagation.
//!
//! Every change to producer or proxy tallies flows through one apply step,
//! which takes a [`DeltaSet`] computed by [`compute_deltas`]. The invariant
//! maintained is that each producer's `total_votes` equals the sum of the
//! `last_vote_weight` of the direct voters naming it (proxies included), and
//! each proxy's `proxied_vote_weight` equals the sum of its delegators'
//! `last_vote_weight`.

use goc_store::{Journaled, Table};
use goc_types::{AccountName, GlobalState, Timestamp};
use serde::{Deserialize, Serialize};

use crate::delta::{compute_deltas, Ballot, DeltaSet};
use crate::error::VotingError;
use crate::producer::ProducerRegistry;
use crate::voter::{VoterInfo, MAX_PRODUCERS_PER_VOTE};
use crate::weight::VoteWeightEngine;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VoterRegistry {
    voters: Table<VoterInfo>,
    #[serde(skip)]
    engine: VoteWeightEngine,
}

impl VoterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_engine(engine: VoteWeightEngine) -> Self {
        Self {
            voters: Table::new(),
            engine,
        }
    }

    pub fn engine(&self) -> &VoteWeightEngine {
        &self.engine
    }

    pub fn get(&self, owner: &AccountName) -> Option<&VoterInfo> {
        self.voters.get(owner)
    }

    pub fn require(&self, owner: &AccountName) -> Result<&VoterInfo, VotingError> {
        self.voters
            .get(owner)
            .ok_or(VotingError::VoterNotFound(*owner))
    }

    pub fn iter(&self) -> impl Iterator<Item = &VoterInfo> + '_ {
        self.voters.iter()
    }

    pub fn len(&self) -> usize {
        self.voters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voters.is_empty()
    }

    /// Current weight of `owner`'s own stake, zero for unknown accounts.
    pub fn stake_weight(&self, owner: &AccountName, now: Timestamp) -> f64 {
        self.voters
            .get(owner)
            .map(|v| self.engine.weight(v.staked, now))
            .unwrap_or(0.0)
    }

    /// Adjust the stake tracked for governance staking.
    pub fn add_goc_staked(&mut self, owner: AccountName, delta: i64) -> Result<(), VotingError> {
        self.require(&owner)?;
        self.voters.modify(&owner, |v| v.goc_staked += delta)?;
        Ok(())
    }

    /// Apply a stake change to `owner` and re-apply its votes.
    ///
    /// Creates the voter record on first stake.
    pub fn update_voting_power(
        &mut self,
        producers: &mut ProducerRegistry,
        global: &mut GlobalState,
        owner: AccountName,
        stake_delta: i64,
        now: Timestamp,
    ) -> Result<(), VotingError> {
        match self.voters.get(&owner) {
            Some(v) => {
                if v.staked + stake_delta < 0 {
                    return Err(VotingError::NegativeStake);
                }
                self.voters.modify(&owner, |v| v.staked += stake_delta)?;
            }
            None => {
                if stake_delta < 0 {
                    return Err(VotingError::NegativeStake);
                }
                let mut voter = VoterInfo::new(owner);
                voter.staked = stake_delta;
                self.voters.emplace(voter)?;
            }
        }

        let voter = self.require(&owner)?.clone();
        if voter.is_voting() {
            self.update_votes(
                producers,
                global,
                owner,
                voter.proxy,
                &voter.producers,
                false,
                now,
            )?;
        }
        Ok(())
    }

    /// Replace `owner`'s ballot and re-apply its weight.
    ///
    /// `voting` is true when the voter itself is changing its vote; stake
    /// changes re-apply an existing ballot with `voting = false`, which
    /// tolerates producers and proxies that have since been deactivated.
    #[allow(clippy::too_many_arguments)]
    pub fn update_votes(
        &mut self,
        producers: &mut ProducerRegistry,
        global: &mut GlobalState,
        owner: AccountName,
        proxy: AccountName,
        producer_list: &[AccountName],
        voting: bool,
        now: Timestamp,
    ) -> Result<(), VotingError> {
        let new_list = if proxy.is_empty() {
            if producer_list.len() > MAX_PRODUCERS_PER_VOTE {
                return Err(VotingError::TooManyProducers(producer_list.len()));
            }
            let mut sorted = producer_list.to_vec();
            sorted.sort();
            if let Some(pair) = sorted.windows(2).find(|w| w[0] == w[1]) {
                return Err(VotingError::DuplicateProducer(pair[0]));
            }
            sorted
        } else {
            if !producer_list.is_empty() {
                return Err(VotingError::ProxyAndProducers);
            }
            if proxy == owner {
                return Err(VotingError::SelfProxy);
            }
            Vec::new()
        };

        let voter = self.require(&owner)?.clone();
        if !proxy.is_empty() && voter.is_proxy {
            return Err(VotingError::ProxyUsesProxy(owner));
        }

        if voter.last_vote_weight <= 0.0 {
            global.total_activated_stake += voter.staked;
            if global.is_activated() && global.thresh_activated_stake_time.is_epoch() {
                global.thresh_activated_stake_time = now;
                tracing::info!(
                    total_activated_stake = global.total_activated_stake,
                    "minimum stake activated"
                );
            }
        }

        let new_ballot = if !proxy.is_empty() {
            let target = self
                .voters
                .get(&proxy)
                .ok_or(VotingError::ProxyNotFound(proxy))?;
            if voting && !target.is_proxy {
                return Err(VotingError::NotAProxy(proxy));
            }
            Ballot::Proxy(proxy)
        } else if new_list.is_empty() {
            Ballot::None
        } else {
            Ballot::Producers(new_list.clone())
        };

        let mut new_weight = self.engine.weight(voter.staked, now);
        if voter.is_proxy {
            new_weight += voter.proxied_vote_weight;
        }

        let deltas = compute_deltas(&voter.ballot(), voter.last_vote_weight, &new_ballot, new_weight);

        self.voters.modify(&owner, |v| {
            v.proxy = proxy;
            v.producers = new_list;
            v.last_vote_weight = new_weight;
        })?;

        self.apply(producers, global, &deltas, voting, now)?;
        tracing::debug!(voter = %owner, weight = new_weight, "votes updated");
        Ok(())
    }

    /// Recompute `owner`'s weight and push the difference to what it votes for.
    pub fn propagate_weight_change(
        &mut self,
        producers: &mut ProducerRegistry,
        global: &mut GlobalState,
        owner: AccountName,
        now: Timestamp,
    ) -> Result<(), VotingError> {
        let voter = self.require(&owner)?.clone();
        let mut new_weight = self.engine.weight(voter.staked, now);
        if voter.is_proxy {
            new_weight += voter.proxied_vote_weight;
        }
        let delta = new_weight - voter.last_vote_weight;

        self.voters
            .modify(&owner, |v| v.last_vote_weight = new_weight)?;

        if delta != 0.0 {
            if voter.has_proxy() {
                self.add_proxied(voter.proxy, delta)?;
                self.propagate_weight_change(producers, global, voter.proxy, now)?;
            } else {
                for p in &voter.producers {
                    producers.add_votes(*p, delta, global)?;
                }
            }
        }
        Ok(())
    }

    /// Register or unregister `proxy` as a proxy.
    pub fn regproxy(
        &mut self,
        producers: &mut ProducerRegistry,
        global: &mut GlobalState,
        proxy: AccountName,
        is_proxy: bool,
        now: Timestamp,
    ) -> Result<(), VotingError> {
        match self.voters.get(&proxy) {
            Some(existing) => {
                if existing.is_proxy == is_proxy {
                    return Err(VotingError::NoEffect);
                }
                if is_proxy && existing.has_proxy() {
                    return Err(VotingError::ProxyUsesProxy(proxy));
                }
                self.voters.modify(&proxy, |v| v.is_proxy = is_proxy)?;
                self.propagate_weight_change(producers, global, proxy, now)?;
            }
            None => {
                if !is_proxy {
                    return Err(VotingError::NoEffect);
                }
                let mut voter = VoterInfo::new(proxy);
                voter.is_proxy = true;
                self.voters.emplace(voter)?;
            }
        }
        tracing::debug!(proxy = %proxy, is_proxy, "proxy status changed");
        Ok(())
    }

    /// Write a delta set to producers and proxies.
    fn apply(
        &mut self,
        producers: &mut ProducerRegistry,
        global: &mut GlobalState,
        deltas: &DeltaSet,
        voting: bool,
        now: Timestamp,
    ) -> Result<(), VotingError> {
        for (proxy, delta) in &deltas.proxies {
            self.add_proxied(*proxy, *delta)?;
            self.propagate_weight_change(producers, global, *proxy, now)?;
        }

        for (owner, delta) in &deltas.producers {
            match producers.get(owner) {
                Some(info) => {
                    if voting && delta.voted && !info.active() {
                        return Err(VotingError::ProducerInactive(*owner));
                    }
                    producers.add_votes(*owner, delta.weight, global)?;
                }
                None => {
                    if delta.voted {
                        return Err(VotingError::ProducerNotFound(*owner));
                    }
                }
            }
        }
        Ok(())
    }

    fn add_proxied(&mut self, proxy: AccountName, delta: f64) -> Result<(), VotingError> {
        if !self.voters.contains(&proxy) {
            return Err(VotingError::ProxyNotFound(proxy));
        }
        self.voters
            .modify(&proxy, |v| v.proxied_vote_weight += delta)?;
        Ok(())
    }
}

impl Journaled for VoterRegistry {
    fn begin(&mut self) {
        self.voters.begin();
    }

    fn commit(&mut self) {
        self.voters.commit();
    }

    fn rollback(&mut self) {
        self.voters.rollback();
    }
}
