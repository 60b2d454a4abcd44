use thiserror::Error;
use tourney_common::error::StoreError;

#[derive(Debug, Error)]
pub(crate) enum RegistrationError {
    #[error("Config error")]
    Config,
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Payment proof is required for paid tournaments")]
    PaymentProofRequired,
    #[error("Failed to read payment proof {0}")]
    PaymentProofRead(#[source] std::io::Error),
    #[error("Store error {0}")]
    Store(#[from] StoreError),
    #[error("Registration {registration_id} stored without leaderboard entry: {source}")]
    LeaderboardEntry {
        registration_id: String,
        #[source]
        source: StoreError,
    },
}
