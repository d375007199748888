//! The premium-name auction.
//!
//! Anyone may bid on a biddable name that does not yet exist. Each bid must
//! beat the standing one; the outbid amount is owed back to the previous
//! bidder through the refund ledger. Once a day the block hook closes the
//! highest open auction whose last bid is at least a day old, after which the
//! winner may claim the name.

use goc_store::{Journaled, Table};
use goc_types::{AccountName, Asset, BlockTimestamp, GlobalState, Timestamp, SECONDS_PER_DAY};
use serde::{Deserialize, Serialize};

use crate::bid::{check_biddable, BidRefund, ByHighBid, NameBid};
use crate::error::AuctionError;

/// Days the chain must have been activated before auctions start closing.
pub const CLOSE_AFTER_ACTIVATION_DAYS: u64 = 14;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NameAuction {
    bids: Table<NameBid, ByHighBid>,
    refunds: Table<BidRefund>,
}

impl NameAuction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bid_for(&self, name: AccountName) -> Option<&NameBid> {
        self.bids.get(&name)
    }

    /// Open auctions by descending bid, then closed ones.
    pub fn ranked(&self) -> impl Iterator<Item = &NameBid> + '_ {
        self.bids.iter_by_index()
    }

    pub fn refund_for(&self, bidder: AccountName, name: AccountName) -> Option<&BidRefund> {
        self.refunds.get(&(bidder, name))
    }

    /// Place a bid. The caller has already collected `bid` from the bidder and
    /// checked that `newname` is not an existing account.
    ///
    /// Returns the refund now owed to the outbid bidder, merged with anything
    /// still owed to them for this name.
    pub fn bid(
        &mut self,
        bidder: AccountName,
        newname: AccountName,
        bid: Asset,
        now: Timestamp,
    ) -> Result<Option<BidRefund>, AuctionError> {
        check_biddable(newname)?;
        if !bid.is_positive() || !bid.is_valid() {
            return Err(AuctionError::NonPositiveBid(bid));
        }

        let Some(current) = self.bids.get(&newname).cloned() else {
            self.bids.emplace(NameBid {
                newname,
                high_bidder: bidder,
                high_bid: bid.amount,
                last_bid_time: now,
            })?;
            tracing::debug!(%newname, %bidder, %bid, "first bid");
            return Ok(None);
        };

        if current.is_closed() {
            return Err(AuctionError::AuctionClosed(newname));
        }
        if bid.amount <= current.high_bid {
            return Err(AuctionError::BidTooLow {
                bid: bid.amount,
                high: current.high_bid,
            });
        }
        if current.high_bidder == bidder {
            return Err(AuctionError::AlreadyHighestBidder(bidder));
        }

        let owed = Asset::new(current.high_bid, bid.symbol);
        let key = (current.high_bidder, newname);
        let refund = match self.refunds.get(&key) {
            Some(existing) => BidRefund {
                amount: existing
                    .amount
                    .checked_add(owed)
                    .ok_or(AuctionError::NonPositiveBid(owed))?,
                ..existing.clone()
            },
            None => BidRefund {
                bidder: current.high_bidder,
                newname,
                amount: owed,
            },
        };
        self.refunds.upsert(refund.clone());
        self.bids.modify(&newname, |b| {
            b.high_bidder = bidder;
            b.high_bid = bid.amount;
            b.last_bid_time = now;
        })?;
        tracing::debug!(%newname, %bidder, %bid, outbid = %current.high_bidder, "outbid");
        Ok(Some(refund))
    }

    /// Pay out and forget the refund owed to `bidder` for `name`.
    pub fn take_refund(&mut self, bidder: AccountName, name: AccountName) -> Result<Asset, AuctionError> {
        let refund = self
            .refunds
            .remove(&(bidder, name))
            .ok_or(AuctionError::RefundNotFound { bidder, name })?;
        Ok(refund.amount)
    }

    /// Close the highest open auction if one is due.
    ///
    /// At most one auction closes per day, only after the chain has been
    /// activated for [`CLOSE_AFTER_ACTIVATION_DAYS`], and only when the last
    /// bid is more than a day old.
    pub fn close_due(&mut self, global: &mut GlobalState, block_time: BlockTimestamp) -> Option<AccountName> {
        if block_time.slots_since(global.last_name_close) <= BlockTimestamp::SLOTS_PER_DAY {
            return None;
        }
        if !global.is_activated() {
            return None;
        }
        let now = block_time.to_timestamp();
        if global.thresh_activated_stake_time.elapsed_since(now) <= CLOSE_AFTER_ACTIVATION_DAYS * SECONDS_PER_DAY {
            return None;
        }
        let highest = self.bids.iter_by_index().next()?;
        if highest.is_closed() || highest.last_bid_time.elapsed_since(now) <= SECONDS_PER_DAY {
            return None;
        }

        let name = highest.newname;
        self.bids.modify(&name, |b| b.high_bid = -b.high_bid).ok()?;
        global.last_name_close = block_time;
        tracing::info!(%name, %block_time, "name auction closed");
        Some(name)
    }

    /// Consume a closed auction won by `claimer`. The caller creates the account.
    pub fn claim(&mut self, claimer: AccountName, name: AccountName) -> Result<NameBid, AuctionError> {
        let bid = self.bids.get(&name).ok_or(AuctionError::BidNotFound(name))?;
        if !bid.is_closed() {
            return Err(AuctionError::AuctionOpen(name));
        }
        if bid.high_bidder != claimer {
            return Err(AuctionError::NotWinner {
                name,
                winner: bid.high_bidder,
            });
        }
        let bid = self.bids.remove(&name).ok_or(AuctionError::BidNotFound(name))?;
        tracing::info!(%name, %claimer, paid = bid.amount(), "name claimed");
        Ok(bid)
    }
}

impl Journaled for NameAuction {
    fn begin(&mut self) {
        self.bids.begin();
        self.refunds.begin();
    }

    fn commit(&mut self) {
        self.bids.commit();
        self.refunds.commit();
    }

    fn rollback(&mut self) {
        self.bids.rollback();
        self.refunds.rollback();
    }
}
