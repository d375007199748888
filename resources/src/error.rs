use goc_store::StoreError;
use goc_types::{AccountName, Asset, ErrorKind, Timestamp};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("no delegation from {from} to {to}")]
    DelegationNotFound { from: AccountName, to: AccountName },

    #[error("insufficient staked {resource}: have {have}, requested {requested}")]
    InsufficientStake {
        resource: &'static str,
        have: Asset,
        requested: Asset,
    },

    #[error("no refund request for {0}")]
    RefundNotFound(AccountName),

    #[error("refund is not available until {0}")]
    RefundNotDue(Timestamp),

    #[error("insufficient RAM quota: have {have} bytes, need {need} bytes")]
    InsufficientRam { have: i64, need: i64 },

    #[error("RAM reservation of {requested} bytes exceeds the {free} bytes available")]
    RamCapacity { requested: i64, free: u64 },

    #[error("invalid RAM size: {0}")]
    InvalidRamSize(String),

    #[error("market conversion failed: {0}")]
    Conversion(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ResourceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidAmount(_) | Self::Conversion(_) => ErrorKind::InvalidAmount,
            Self::DelegationNotFound { .. } | Self::RefundNotFound(_) => ErrorKind::NotFound,
            Self::InsufficientStake { .. } | Self::InsufficientRam { .. } => {
                ErrorKind::InsufficientBalance
            }
            Self::RefundNotDue(_) => ErrorKind::OutOfWindow,
            Self::RamCapacity { .. } => ErrorKind::CapacityExceeded,
            Self::InvalidRamSize(_) => ErrorKind::InvalidArgument,
            Self::Store(e) => e.kind(),
        }
    }
}
