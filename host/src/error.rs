use goc_types::{AccountName, Asset, ErrorKind};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum HostError {
    #[error("{account} has {available}, needs {needed}")]
    InsufficientFunds {
        account: AccountName,
        needed: Asset,
        available: Asset,
    },

    #[error("account {0} does not exist")]
    UnknownAccount(AccountName),

    #[error("account {0} already exists")]
    AccountExists(AccountName),

    #[error("collaborator rejected the effect: {0}")]
    Rejected(String),
}

impl HostError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InsufficientFunds { .. } => ErrorKind::InsufficientBalance,
            Self::UnknownAccount(_) => ErrorKind::NotFound,
            Self::AccountExists(_) => ErrorKind::InvalidArgument,
            Self::Rejected(_) => ErrorKind::Host,
        }
    }
}
