//! Stake to vote-weight conversion.
//!
//! Weight grows by a factor of two every 52 weeks since the launch epoch, so
//! a fresh vote always outweighs an equally staked stale one. Whole weeks
//! are counted; the year fraction is not rounded.

use goc_types::{BlockTimestamp, Timestamp, SECONDS_PER_DAY};

const SECONDS_PER_WEEK: u64 = 7 * SECONDS_PER_DAY;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteWeightEngine {
    launch_secs: u64,
}

impl Default for VoteWeightEngine {
    fn default() -> Self {
        Self {
            launch_secs: BlockTimestamp::EPOCH_SECS,
        }
    }
}

impl VoteWeightEngine {
    pub const fn with_launch(launch_secs: u64) -> Self {
        Self { launch_secs }
    }

    /// `staked * 2^(weeks_since_launch / 52)`.
    pub fn weight(&self, staked: i64, now: Timestamp) -> f64 {
        let weeks = now.as_secs().saturating_sub(self.launch_secs) / SECONDS_PER_WEEK;
        staked as f64 * 2f64.powf(weeks as f64 / 52.0)
    }
}

/// Weight under the default launch epoch.
pub fn stake_to_vote(staked: i64, now: Timestamp) -> f64 {
    VoteWeightEngine::default().weight(staked, now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_at_launch_equals_stake() {
        let engine = VoteWeightEngine::with_launch(1_000);
        assert_eq!(engine.weight(500, Timestamp::new(1_000)), 500.0);
        assert_eq!(engine.weight(500, Timestamp::new(10)), 500.0);
    }

    #[test]
    fn weight_doubles_every_52_weeks() {
        let engine = VoteWeightEngine::with_launch(0);
        let year = Timestamp::new(52 * SECONDS_PER_WEEK);
        assert_eq!(engine.weight(100, year), 200.0);
        let two_years = Timestamp::new(104 * SECONDS_PER_WEEK);
        assert_eq!(engine.weight(100, two_years), 400.0);
    }

    #[test]
    fn partial_weeks_do_not_count() {
        let engine = VoteWeightEngine::with_launch(0);
        let a = engine.weight(100, Timestamp::new(SECONDS_PER_WEEK));
        let b = engine.weight(100, Timestamp::new(2 * SECONDS_PER_WEEK - 1));
        assert_eq!(a, b);
        assert!(a > 100.0);
    }
}
