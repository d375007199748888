//! Pure vote-delta computation.
//!
//! Changing a vote removes the voter's previous weight from whatever it was
//! applied to and adds the new weight to the new target. Rather than doing
//! that in place, [`compute_deltas`] folds both halves into one signed
//! [`DeltaSet`]; the registry then applies it in a single step.

use goc_types::AccountName;
use std::collections::BTreeMap;

/// What a voter's weight is currently applied to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ballot {
    None,
    Proxy(AccountName),
    Producers(Vec<AccountName>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProducerDelta {
    pub weight: f64,
    /// True if the producer is part of the new ballot and must be votable.
    pub voted: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeltaSet {
    pub producers: BTreeMap<AccountName, ProducerDelta>,
    pub proxies: BTreeMap<AccountName, f64>,
}

impl DeltaSet {
    pub fn is_empty(&self) -> bool {
        self.producers.is_empty() && self.proxies.is_empty()
    }

    /// Net weight added to producers by this change.
    pub fn producer_total(&self) -> f64 {
        self.producers.values().map(|d| d.weight).sum()
    }

    fn add_producer(&mut self, producer: AccountName, weight: f64, voted: bool) {
        let entry = self.producers.entry(producer).or_insert(ProducerDelta {
            weight: 0.0,
            voted: false,
        });
        entry.weight += weight;
        entry.voted |= voted;
    }

    fn add_proxy(&mut self, proxy: AccountName, weight: f64) {
        *self.proxies.entry(proxy).or_insert(0.0) += weight;
    }
}

/// Signed deltas for moving `old_weight` on `old` to `new_weight` on `new`.
///
/// Non-positive weights contribute nothing, so a voter that never applied
/// weight has nothing to undo.
pub fn compute_deltas(old: &Ballot, old_weight: f64, new: &Ballot, new_weight: f64) -> DeltaSet {
    let mut set = DeltaSet::default();

    if old_weight > 0.0 {
        match old {
            Ballot::None => {}
            Ballot::Proxy(proxy) => set.add_proxy(*proxy, -old_weight),
            Ballot::Producers(list) => {
                for p in list {
                    set.add_producer(*p, -old_weight, false);
                }
            }
        }
    }

    match new {
        Ballot::None => {}
        Ballot::Proxy(proxy) => {
            if new_weight >= 0.0 {
                set.add_proxy(*proxy, new_weight);
            }
        }
        Ballot::Producers(list) => {
            for p in list {
                set.add_producer(*p, new_weight.max(0.0), true);
            }
        }
    }

    set
}
