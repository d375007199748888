//! Resource economics: staked bandwidth and the RAM market.

pub mod delegation;
pub mod error;
pub mod ram_market;

pub use delegation::{
    DelegatedBandwidth, DelegationLedger, RefundRequest, StakeChange, UserResources,
    REFUND_DELAY_SECS,
};
pub use error::ResourceError;
pub use ram_market::{
    ram_fee, Connector, RamMarket, RamPurchase, RamSale, DEFAULT_RAM_FEE_BPS, RAMCORE_SYMBOL,
    RAM_SYMBOL,
};
