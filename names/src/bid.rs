//! Auction records.

use goc_store::{Descending, Field, Persisted, Row, SecondaryKey, Schema};
use goc_types::{AccountName, Asset, Timestamp};
use serde::{Deserialize, Serialize};

use crate::error::AuctionError;

/// The current state of the auction for one name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameBid {
    pub newname: AccountName,
    pub high_bidder: AccountName,
    /// Negative once the auction has closed and awaits its claim.
    pub high_bid: i64,
    pub last_bid_time: Timestamp,
}

impl NameBid {
    pub fn is_closed(&self) -> bool {
        self.high_bid < 0
    }

    /// The winning amount, whether or not the auction has closed.
    pub fn amount(&self) -> i64 {
        self.high_bid.abs()
    }
}

impl Row for NameBid {
    type Key = AccountName;
    const TABLE: &'static str = "namebids";

    fn primary_key(&self) -> AccountName {
        self.newname
    }
}

/// Open auctions first, highest bid first.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByHighBid;

impl SecondaryKey<NameBid> for ByHighBid {
    type Key = (bool, Descending<i64>);

    fn key(row: &NameBid) -> Self::Key {
        (row.is_closed(), Descending(row.high_bid))
    }
}

impl Persisted for NameBid {
    const SCHEMA: Schema = Schema {
        entity: "name_bid",
        table: "namebids",
        version: 1,
        fields: &[
            Field::new("newname", "name"),
            Field::new("high_bidder", "name"),
            Field::new("high_bid", "int64"),
            Field::new("last_bid_time", "time"),
        ],
    };
}

/// An outbid amount owed back to a bidder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidRefund {
    pub bidder: AccountName,
    pub newname: AccountName,
    pub amount: Asset,
}

impl Row for BidRefund {
    type Key = (AccountName, AccountName);
    const TABLE: &'static str = "bidrefunds";

    fn primary_key(&self) -> Self::Key {
        (self.bidder, self.newname)
    }
}

impl Persisted for BidRefund {
    const SCHEMA: Schema = Schema {
        entity: "bid_refund",
        table: "bidrefunds",
        version: 1,
        fields: &[
            Field::new("bidder", "name"),
            Field::new("newname", "name"),
            Field::new("amount", "asset"),
        ],
    };
}

/// Whether `name` can be auctioned at all.
pub fn check_biddable(name: AccountName) -> Result<(), AuctionError> {
    if name.is_empty() {
        return Err(AuctionError::EmptyName);
    }
    if name.has_thirteenth_char() {
        return Err(AuctionError::ThirteenChars);
    }
    if name.is_twelve_chars() {
        return Err(AuctionError::NoAuctionNeeded);
    }
    if name.suffix() != name {
        return Err(AuctionError::NotTopLevel(name));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(s: &str) -> AccountName {
        s.parse().unwrap()
    }

    #[test]
    fn biddable_names() {
        assert!(check_biddable(n("goc")).is_ok());
        assert!(check_biddable(n("short")).is_ok());
        assert!(matches!(check_biddable(AccountName::EMPTY), Err(AuctionError::EmptyName)));
        assert!(matches!(check_biddable(n("abcdefghijkl")), Err(AuctionError::NoAuctionNeeded)));
        assert!(matches!(check_biddable(n("abcdefghijkla")), Err(AuctionError::ThirteenChars)));
        assert!(matches!(check_biddable(n("alice.goc")), Err(AuctionError::NotTopLevel(_))));
    }

    #[test]
    fn closed_auctions_sort_last() {
        let open = |h| NameBid {
            newname: AccountName::EMPTY,
            high_bidder: AccountName::EMPTY,
            high_bid: h,
            last_bid_time: Timestamp::EPOCH,
        };
        assert!(ByHighBid::key(&open(900)) < ByHighBid::key(&open(100)));
        assert!(ByHighBid::key(&open(1)) < ByHighBid::key(&open(-5_000)));
        assert_eq!(open(-5_000).amount(), 5_000);
    }
}
