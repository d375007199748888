//! The contract's action surface.

use goc_governance::{NewProposal, StartMode};
use goc_types::{AccountName, Asset, BlockTimestamp, ChainParameters, GocParams, PublicKey};
use serde::{Deserialize, Serialize};

/// Whose authority an action needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Authority {
    /// The configured system account.
    System,
    Account(AccountName),
}

/// Every action the contract accepts, tagged by its on-chain name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Action {
    OnBlock {
        timestamp: BlockTimestamp,
        producer: AccountName,
    },
    DelegateBw {
        from: AccountName,
        receiver: AccountName,
        stake_net_quantity: Asset,
        stake_cpu_quantity: Asset,
        #[serde(default)]
        transfer: bool,
    },
    UndelegateBw {
        from: AccountName,
        receiver: AccountName,
        unstake_net_quantity: Asset,
        unstake_cpu_quantity: Asset,
    },
    Refund {
        owner: AccountName,
    },
    BuyRam {
        payer: AccountName,
        receiver: AccountName,
        quant: Asset,
    },
    BuyRamBytes {
        payer: AccountName,
        receiver: AccountName,
        bytes: u32,
    },
    SellRam {
        account: AccountName,
        bytes: i64,
    },
    RegProducer {
        producer: AccountName,
        producer_key: PublicKey,
        #[serde(default)]
        url: String,
        #[serde(default)]
        location: u16,
    },
    UnregProd {
        producer: AccountName,
    },
    RmvProducer {
        producer: AccountName,
    },
    SetRam {
        max_ram_size: u64,
    },
    VoteProducer {
        voter: AccountName,
        #[serde(default)]
        proxy: AccountName,
        #[serde(default)]
        producers: Vec<AccountName>,
    },
    RegProxy {
        proxy: AccountName,
        isproxy: bool,
    },
    SetParams {
        params: ChainParameters,
    },
    SetGocParams {
        params: GocParams,
    },
    ClaimRewards {
        owner: AccountName,
    },
    SetPriv {
        account: AccountName,
        is_priv: bool,
    },
    BidName {
        bidder: AccountName,
        newname: AccountName,
        bid: Asset,
    },
    BidRefund {
        bidder: AccountName,
        newname: AccountName,
    },
    ClaimName {
        claimer: AccountName,
        newname: AccountName,
        key: PublicKey,
    },
    GocStake {
        payer: AccountName,
    },
    GocUnstake {
        receiver: AccountName,
    },
    GocNewProp {
        owner: AccountName,
        fee: Asset,
        proposal_name: String,
        proposal_content: String,
        #[serde(default)]
        url: String,
        #[serde(default)]
        start_mode: StartMode,
    },
    GocUpProp {
        owner: AccountName,
        id: u64,
        proposal_name: String,
        proposal_content: String,
        #[serde(default)]
        url: String,
    },
    GocVote {
        voter: AccountName,
        id: u64,
        yea: bool,
    },
    GocBpVote {
        bp: AccountName,
        id: u64,
        yea: bool,
    },
    GocSettle {
        caller: AccountName,
        id: u64,
    },
    GocClaim {
        owner: AccountName,
    },
}

impl Action {
    /// The on-chain action name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::OnBlock { .. } => "onblock",
            Self::DelegateBw { .. } => "delegatebw",
            Self::UndelegateBw { .. } => "undelegatebw",
            Self::Refund { .. } => "refund",
            Self::BuyRam { .. } => "buyram",
            Self::BuyRamBytes { .. } => "buyrambytes",
            Self::SellRam { .. } => "sellram",
            Self::RegProducer { .. } => "regproducer",
            Self::UnregProd { .. } => "unregprod",
            Self::RmvProducer { .. } => "rmvproducer",
            Self::SetRam { .. } => "setram",
            Self::VoteProducer { .. } => "voteproducer",
            Self::RegProxy { .. } => "regproxy",
            Self::SetParams { .. } => "setparams",
            Self::SetGocParams { .. } => "setgocparams",
            Self::ClaimRewards { .. } => "claimrewards",
            Self::SetPriv { .. } => "setpriv",
            Self::BidName { .. } => "bidname",
            Self::BidRefund { .. } => "bidrefund",
            Self::ClaimName { .. } => "claimname",
            Self::GocStake { .. } => "gocstake",
            Self::GocUnstake { .. } => "gocunstake",
            Self::GocNewProp { .. } => "gocnewprop",
            Self::GocUpProp { .. } => "gocupprop",
            Self::GocVote { .. } => "gocvote",
            Self::GocBpVote { .. } => "gocbpvote",
            Self::GocSettle { .. } => "gocsettle",
            Self::GocClaim { .. } => "gocclaim",
        }
    }

    pub fn authority(&self) -> Authority {
        use Authority::{Account, System};
        match self {
            Self::OnBlock { .. }
            | Self::RmvProducer { .. }
            | Self::SetRam { .. }
            | Self::SetParams { .. }
            | Self::SetGocParams { .. }
            | Self::SetPriv { .. } => System,
            Self::DelegateBw { from, .. } | Self::UndelegateBw { from, .. } => Account(*from),
            Self::Refund { owner } | Self::ClaimRewards { owner } | Self::GocClaim { owner } => {
                Account(*owner)
            }
            Self::BuyRam { payer, .. } | Self::BuyRamBytes { payer, .. } | Self::GocStake { payer } => {
                Account(*payer)
            }
            Self::SellRam { account, .. } => Account(*account),
            Self::RegProducer { producer, .. } | Self::UnregProd { producer } => Account(*producer),
            Self::VoteProducer { voter, .. } | Self::GocVote { voter, .. } => Account(*voter),
            Self::RegProxy { proxy, .. } => Account(*proxy),
            Self::BidName { bidder, .. } | Self::BidRefund { bidder, .. } => Account(*bidder),
            Self::ClaimName { claimer, .. } => Account(*claimer),
            Self::GocUnstake { receiver } => Account(*receiver),
            Self::GocNewProp { owner, .. } | Self::GocUpProp { owner, .. } => Account(*owner),
            Self::GocBpVote { bp, .. } => Account(*bp),
            Self::GocSettle { caller, .. } => Account(*caller),
        }
    }

    pub(crate) fn into_proposal(self) -> Option<NewProposal> {
        match self {
            Self::GocNewProp {
                owner,
                fee,
                proposal_name,
                proposal_content,
                url,
                start_mode,
            } => Some(NewProposal {
                owner,
                fee,
                name: proposal_name,
                content: proposal_content,
                url,
                start_mode,
            }),
            _ => None,
        }
    }
}
