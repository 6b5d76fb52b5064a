use shellbook_store::StoreError;
use shellbook_types::ChainAccount;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Invalid XPR account name format")]
    InvalidAccountName(String),

    #[error("tx_id must be a 64-character hex transaction id")]
    InvalidTxId(String),

    #[error("XPR account @{account} is already linked to agent \"{holder}\"")]
    AlreadyLinked { account: ChainAccount, holder: String },

    #[error("Agent is already verified as XPR account @{0}")]
    AlreadyVerified(ChainAccount),

    #[error("No pending challenge for @{0}. Request one first.")]
    NoPendingChallenge(ChainAccount),

    #[error("Challenge expired. Request a new one.")]
    ChallengeExpired,

    #[error("Signature verification failed: {0}")]
    SignatureRejected(String),

    #[error("Transaction verification failed: {0}")]
    TransactionRejected(String),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// Coarse classification used by the HTTP layer and metrics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Conflict,
    NotFound,
    Expired,
    ProofRejected,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Conflict => "conflict",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Expired => "expired",
            ErrorKind::ProofRejected => "proof_rejected",
            ErrorKind::Internal => "internal",
        }
    }
}

impl VerificationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            VerificationError::MissingField(_)
            | VerificationError::InvalidAccountName(_)
            | VerificationError::InvalidTxId(_) => ErrorKind::Validation,
            VerificationError::AlreadyLinked { .. } | VerificationError::AlreadyVerified(_) => {
                ErrorKind::Conflict
            }
            VerificationError::NoPendingChallenge(_) => ErrorKind::NotFound,
            VerificationError::ChallengeExpired => ErrorKind::Expired,
            VerificationError::SignatureRejected(_) | VerificationError::TransactionRejected(_) => {
                ErrorKind::ProofRejected
            }
            VerificationError::Store(_) => ErrorKind::Internal,
        }
    }
}
