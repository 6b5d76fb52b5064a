use shellbook_types::{ChainAccount, IdentityId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("key not found: {0}")]
    NotFound(String),

    #[error("duplicate key: {0}")]
    Duplicate(String),

    /// A conditional write lost: the chain account is held by another identity.
    #[error("chain account {account} is already linked to identity {holder}")]
    LinkConflict {
        account: ChainAccount,
        holder: IdentityId,
    },

    /// The identity has already completed a link.
    #[error("identity {id} is already verified as {account}")]
    AlreadyVerified { id: IdentityId, account: ChainAccount },

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
