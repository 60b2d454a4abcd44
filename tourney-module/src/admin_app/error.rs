use thiserror::Error;
use tourney_common::error::StoreError;

#[derive(Debug, Error)]
pub(crate) enum AdminError {
    #[error("Config error")]
    Config,
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Nothing to update")]
    EmptyUpdate,
    #[error("Registration {0} has no payment screenshot")]
    NoPaymentProof(String),
    #[error("Auto-rank stopped after {applied} of {total} entries: {source}")]
    PartialRank {
        applied: usize,
        total: usize,
        #[source]
        source: StoreError,
    },
    #[error("Failed to write export {0}")]
    Export(#[from] std::io::Error),
    #[error("Store error {0}")]
    Store(#[from] StoreError),
}
