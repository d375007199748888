use goc_store::StoreError;
use goc_types::{AccountName, Asset, ErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuctionError {
    #[error("the empty name is not a valid account name to bid on")]
    EmptyName,

    #[error("13 character names are not valid account names to bid on")]
    ThirteenChars,

    #[error("accounts with 12 character names and no dots can be created without bidding")]
    NoAuctionNeeded,

    #[error("you can only bid on top-level suffix names, not {0}")]
    NotTopLevel(AccountName),

    #[error("account {0} already exists")]
    AccountExists(AccountName),

    #[error("bid must be positive, got {0}")]
    NonPositiveBid(Asset),

    #[error("bid of {bid} must exceed the current high bid of {high}")]
    BidTooLow { bid: i64, high: i64 },

    #[error("{0} is already the highest bidder")]
    AlreadyHighestBidder(AccountName),

    #[error("auction for {0} has already closed")]
    AuctionClosed(AccountName),

    #[error("auction for {0} is not closed yet")]
    AuctionOpen(AccountName),

    #[error("no bid for {0}")]
    BidNotFound(AccountName),

    #[error("only the highest bidder {winner} may claim {name}")]
    NotWinner {
        name: AccountName,
        winner: AccountName,
    },

    #[error("no refund due to {bidder} for {name}")]
    RefundNotFound {
        bidder: AccountName,
        name: AccountName,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AuctionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyName
            | Self::ThirteenChars
            | Self::NoAuctionNeeded
            | Self::NotTopLevel(_)
            | Self::AccountExists(_)
            | Self::AlreadyHighestBidder(_) => ErrorKind::InvalidArgument,
            Self::NonPositiveBid(_) | Self::BidTooLow { .. } => ErrorKind::InvalidAmount,
            Self::AuctionClosed(_) => ErrorKind::AlreadyClaimed,
            Self::AuctionOpen(_) => ErrorKind::OutOfWindow,
            Self::BidNotFound(_) | Self::RefundNotFound { .. } => ErrorKind::NotFound,
            Self::NotWinner { .. } => ErrorKind::Unauthorized,
            Self::Store(e) => e.kind(),
        }
    }
}
