//! Nullable token ledger: balances in memory, batches applied all-or-nothing.

use std::collections::HashMap;
use std::sync::Mutex;

use goc_host::{HostError, TokenLedger, TokenOp};
use goc_types::{AccountName, Asset, Symbol};

use crate::lock;

#[derive(Debug, Clone, Default)]
struct Balances {
    accounts: HashMap<(AccountName, Symbol), i64>,
    supply: HashMap<Symbol, i64>,
}

impl Balances {
    fn apply(&mut self, op: &TokenOp) -> Result<(), HostError> {
        match op {
            TokenOp::Transfer {
                from, to, quantity, ..
            } => {
                if quantity.amount <= 0 {
                    return Err(HostError::Rejected(format!("must transfer positive quantity, got {quantity}")));
                }
                if from == to {
                    return Err(HostError::Rejected(format!("cannot transfer to self ({from})")));
                }
                let available = self.accounts.get(&(*from, quantity.symbol)).copied().unwrap_or(0);
                if available < quantity.amount {
                    return Err(HostError::InsufficientFunds {
                        account: *from,
                        needed: *quantity,
                        available: Asset::new(available, quantity.symbol),
                    });
                }
                *self.accounts.entry((*from, quantity.symbol)).or_default() -= quantity.amount;
                *self.accounts.entry((*to, quantity.symbol)).or_default() += quantity.amount;
            }
            TokenOp::Issue { to, quantity, .. } => {
                if quantity.amount <= 0 {
                    return Err(HostError::Rejected(format!("must issue positive quantity, got {quantity}")));
                }
                *self.supply.entry(quantity.symbol).or_default() += quantity.amount;
                *self.accounts.entry((*to, quantity.symbol)).or_default() += quantity.amount;
            }
        }
        Ok(())
    }
}

/// An in-memory token contract.
#[derive(Debug, Default)]
pub struct NullTokenLedger {
    balances: Mutex<Balances>,
    applied: Mutex<Vec<TokenOp>>,
    fail_next: Mutex<Option<String>>,
}

impl NullTokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint `quantity` straight into `owner`, growing the supply.
    pub fn credit(&self, owner: AccountName, quantity: Asset) {
        let mut balances = lock(&self.balances);
        *balances.supply.entry(quantity.symbol).or_default() += quantity.amount;
        *balances.accounts.entry((owner, quantity.symbol)).or_default() += quantity.amount;
    }

    /// Reject the next batch with `reason`.
    pub fn fail_next_batch(&self, reason: &str) {
        *lock(&self.fail_next) = Some(reason.to_string());
    }

    /// Every operation applied so far, in order.
    pub fn applied(&self) -> Vec<TokenOp> {
        lock(&self.applied).clone()
    }

    /// Transfers into `to`, with their memos.
    pub fn transfers_to(&self, to: AccountName) -> Vec<(AccountName, Asset, String)> {
        lock(&self.applied)
            .iter()
            .filter_map(|op| match op {
                TokenOp::Transfer {
                    from,
                    to: dest,
                    quantity,
                    memo,
                } if *dest == to => Some((*from, *quantity, memo.clone())),
                _ => None,
            })
            .collect()
    }
}

impl TokenLedger for NullTokenLedger {
    fn balance(&self, owner: AccountName, symbol: Symbol) -> Asset {
        let amount = lock(&self.balances)
            .accounts
            .get(&(owner, symbol))
            .copied()
            .unwrap_or(0);
        Asset::new(amount, symbol)
    }

    fn supply(&self, symbol: Symbol) -> Asset {
        let amount = lock(&self.balances).supply.get(&symbol).copied().unwrap_or(0);
        Asset::new(amount, symbol)
    }

    fn apply(&self, ops: &[TokenOp]) -> Result<(), HostError> {
        if let Some(reason) = lock(&self.fail_next).take() {
            return Err(HostError::Rejected(reason));
        }
        let mut balances = lock(&self.balances);
        let mut next = balances.clone();
        for op in ops {
            next.apply(op)?;
        }
        *balances = next;
        lock(&self.applied).extend(ops.iter().cloned());
        tracing::trace!(ops = ops.len(), "token batch applied");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SYS: Symbol = Symbol::from_static(4, "SYS");

    fn n(s: &'static str) -> AccountName {
        AccountName::from_static(s)
    }

    fn transfer(from: &'static str, to: &'static str, amount: i64) -> TokenOp {
        TokenOp::Transfer {
            from: n(from),
            to: n(to),
            quantity: Asset::new(amount, SYS),
            memo: String::new(),
        }
    }

    #[test]
    fn batch_is_all_or_nothing() {
        let ledger = NullTokenLedger::new();
        ledger.credit(n("alice"), Asset::new(100, SYS));

        let err = ledger
            .apply(&[transfer("alice", "bob", 60), transfer("alice", "carol", 60)])
            .unwrap_err();
        assert!(matches!(err, HostError::InsufficientFunds { .. }));
        assert_eq!(ledger.balance(n("alice"), SYS).amount, 100);
        assert_eq!(ledger.balance(n("bob"), SYS).amount, 0);
        assert!(ledger.applied().is_empty());

        ledger.apply(&[transfer("alice", "bob", 60)]).unwrap();
        assert_eq!(ledger.balance(n("bob"), SYS).amount, 60);
        assert_eq!(ledger.transfers_to(n("bob")).len(), 1);
    }

    #[test]
    fn issue_grows_supply() {
        let ledger = NullTokenLedger::new();
        ledger.credit(n("alice"), Asset::new(10, SYS));
        ledger
            .apply(&[TokenOp::Issue {
                to: n("eosio"),
                quantity: Asset::new(5, SYS),
                memo: String::new(),
            }])
            .unwrap();
        assert_eq!(ledger.supply(SYS).amount, 15);
    }

    #[test]
    fn forced_failure_applies_nothing() {
        let ledger = NullTokenLedger::new();
        ledger.credit(n("alice"), Asset::new(10, SYS));
        ledger.fail_next_batch("ledger offline");
        assert!(ledger.apply(&[transfer("alice", "bob", 1)]).is_err());
        assert!(ledger.apply(&[transfer("alice", "bob", 1)]).is_ok());
    }
}
