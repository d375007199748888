//! Auxiliary accounts holding the contract's tokens.

use goc_types::AccountName;

/// Staked bandwidth.
pub const STAKE_ACCOUNT: AccountName = AccountName::from_static("eosio.stake");
/// Tokens backing the RAM market.
pub const RAM_ACCOUNT: AccountName = AccountName::from_static("eosio.ram");
pub const RAM_FEE_ACCOUNT: AccountName = AccountName::from_static("eosio.ramfee");
/// Name-auction bids.
pub const NAMES_ACCOUNT: AccountName = AccountName::from_static("eosio.names");
pub const SAVING_ACCOUNT: AccountName = AccountName::from_static("eosio.saving");
pub const BPAY_ACCOUNT: AccountName = AccountName::from_static("eosio.bpay");
pub const VPAY_ACCOUNT: AccountName = AccountName::from_static("eosio.vpay");
/// Proposal fee escrow, action fees and both governance buckets.
pub const GOC_ACCOUNT: AccountName = AccountName::from_static("eosio.goc");

/// Every auxiliary account, for hosts that must create them up front.
pub const AUXILIARY_ACCOUNTS: [AccountName; 8] = [
    STAKE_ACCOUNT,
    RAM_ACCOUNT,
    RAM_FEE_ACCOUNT,
    NAMES_ACCOUNT,
    SAVING_ACCOUNT,
    BPAY_ACCOUNT,
    VPAY_ACCOUNT,
    GOC_ACCOUNT,
];
