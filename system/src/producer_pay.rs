//! Inflation and producer rewards.
//!
//! New tokens are minted lazily, on each claim, for the time elapsed since
//! the previous fill at a continuous annual rate. One fifth goes to
//! producers: a quarter of that into the per-block bucket, the rest into the
//! per-vote bucket. The remainder is savings, from which the governance
//! inflows are diverted into the voter and gn buckets.

use goc_types::{AccountName, Asset, SECONDS_PER_DAY};
use goc_voting::VotingError;

use crate::accounts::{BPAY_ACCOUNT, GOC_ACCOUNT, SAVING_ACCOUNT, VPAY_ACCOUNT};
use crate::contract::ActionCtx;
use crate::SystemError;

pub const CONTINUOUS_RATE: f64 = 0.04879;
pub const SECONDS_PER_YEAR: u64 = 52 * 7 * SECONDS_PER_DAY;
/// Per-vote pay below this many whole tokens is withheld.
pub const MIN_PERVOTE_DAILY_PAY: i64 = 100;

/// How one fill of newly minted tokens is divided.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InflationSplit {
    pub per_block: i64,
    pub per_vote: i64,
    pub savings: i64,
    pub voter_bucket: i64,
    pub gn_bucket: i64,
}

impl InflationSplit {
    pub fn of(new_tokens: i64, voter_inflow_bps: u32, gn_inflow_bps: u32) -> Self {
        let to_producers = new_tokens / 5;
        let to_savings = new_tokens - to_producers;
        let per_block = to_producers / 4;
        let voter_bucket = bps_of(to_savings, voter_inflow_bps);
        let gn_bucket = bps_of(to_savings, gn_inflow_bps);
        Self {
            per_block,
            per_vote: to_producers - per_block,
            savings: to_savings - voter_bucket - gn_bucket,
            voter_bucket,
            gn_bucket,
        }
    }

    pub fn total(&self) -> i64 {
        self.per_block + self.per_vote + self.savings + self.voter_bucket + self.gn_bucket
    }
}

fn bps_of(amount: i64, bps: u32) -> i64 {
    i64::try_from(i128::from(amount) * i128::from(bps) / 10_000).unwrap_or(0)
}

impl ActionCtx<'_> {
    pub(crate) fn claimrewards(&mut self, owner: AccountName) -> Result<(), SystemError> {
        let producer = self.state.producers.require(&owner)?.clone();
        if !producer.active() {
            return Err(VotingError::ProducerInactive(owner).into());
        }
        if !self.state.global.is_activated() {
            return Err(SystemError::NotActivated("claim rewards"));
        }
        let now = self.now;
        if producer.last_claim_time.elapsed_since(now) <= SECONDS_PER_DAY {
            return Err(SystemError::ClaimTooSoon {
                last_claim: producer.last_claim_time,
                now,
            });
        }

        self.fill_buckets();

        let producers = &self.state.producers;
        let elected_weight: f64 = self
            .state
            .election
            .schedule()
            .iter()
            .filter_map(|p| producers.get(&p.producer_name))
            .map(|p| p.total_votes)
            .sum();
        let global = &mut self.state.global;
        let per_block = if global.total_unpaid_blocks > 0 {
            let share = i128::from(global.perblock_bucket) * i128::from(producer.unpaid_blocks)
                / i128::from(global.total_unpaid_blocks);
            i64::try_from(share).unwrap_or(0)
        } else {
            0
        };

        let mut per_vote = 0;
        if self.state.election.is_elected(&owner) && elected_weight > 0.0 {
            per_vote = (global.pervote_bucket as f64 * producer.total_votes / elected_weight) as i64;
            per_vote = per_vote.clamp(0, global.pervote_bucket);
        }
        if per_vote < MIN_PERVOTE_DAILY_PAY * self.config.core_symbol.unit() {
            per_vote = 0;
        }

        global.perblock_bucket -= per_block;
        global.pervote_bucket -= per_vote;
        global.total_unpaid_blocks = global.total_unpaid_blocks.saturating_sub(producer.unpaid_blocks);
        self.state.producers.record_claim(owner, now)?;

        let core = self.core_symbol();
        if per_block > 0 {
            self.effects
                .transfer(BPAY_ACCOUNT, owner, Asset::new(per_block, core), "producer block pay");
        }
        if per_vote > 0 {
            self.effects
                .transfer(VPAY_ACCOUNT, owner, Asset::new(per_vote, core), "producer vote pay");
        }
        tracing::info!(producer = %owner, per_block, per_vote, "rewards claimed");
        Ok(())
    }

    /// Mint inflation for the time since the last fill.
    fn fill_buckets(&mut self) {
        let now = self.now;
        let last = self.state.global.last_pervote_bucket_fill;
        if last.is_epoch() || now <= last {
            return;
        }
        let core = self.core_symbol();
        let supply = self.host.tokens.supply(core).amount;
        let elapsed = last.elapsed_since(now);
        let new_tokens = (CONTINUOUS_RATE * supply as f64 * elapsed as f64 / SECONDS_PER_YEAR as f64) as i64;

        let global = &mut self.state.global;
        let split = InflationSplit::of(new_tokens, global.goc_voter_inflow_bps, global.goc_gn_inflow_bps);
        global.perblock_bucket += split.per_block;
        global.pervote_bucket += split.per_vote;
        global.goc_voter_bucket += split.voter_bucket;
        global.goc_gn_bucket += split.gn_bucket;
        global.last_pervote_bucket_fill = now;

        for (to, amount, memo) in [
            (BPAY_ACCOUNT, split.per_block, "fund per-block bucket"),
            (VPAY_ACCOUNT, split.per_vote, "fund per-vote bucket"),
            (SAVING_ACCOUNT, split.savings, "unallocated inflation"),
            (GOC_ACCOUNT, split.voter_bucket + split.gn_bucket, "fund governance buckets"),
        ] {
            if amount > 0 {
                self.effects.issue(to, Asset::new(amount, core), memo);
            }
        }
        tracing::debug!(new_tokens, elapsed, "inflation issued");
    }
}
