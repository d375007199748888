//! Premium account-name auction.
//!
//! Names that are shorter than twelve characters and have no dots are scarce;
//! they are sold to the highest bidder instead of being created freely.

pub mod auction;
pub mod bid;
pub mod error;

pub use auction::{NameAuction, CLOSE_AFTER_ACTIVATION_DAYS};
pub use bid::{check_biddable, BidRefund, ByHighBid, NameBid};
pub use error::AuctionError;
