//! Verification challenge storage trait.

use crate::StoreError;
use shellbook_types::{ChainAccount, IdentityId, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChallengeId(Uuid);

impl ChallengeId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ChallengeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A pending proof-of-control challenge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeRecord {
    pub id: ChallengeId,
    pub identity: IdentityId,
    /// Account the identity is trying to prove control of.
    pub chain_account: ChainAccount,
    /// The string to sign / embed in a transfer memo.
    pub challenge: String,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}

impl ChallengeRecord {
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now >= self.expires_at
    }
}

/// Trait for challenge storage. At most one record per identity.
pub trait ChallengeStore: Send + Sync {
    /// Insert or replace the identity's pending challenge.
    fn put_challenge(&self, record: &ChallengeRecord) -> Result<(), StoreError>;

    fn get_challenge(&self, identity: &IdentityId) -> Result<Option<ChallengeRecord>, StoreError>;

    /// Delete the identity's challenge if it is still `id`.
    ///
    /// Returns whether a record was removed. Deleting an absent or already
    /// replaced challenge is not an error.
    fn delete_challenge(&self, identity: &IdentityId, id: &ChallengeId)
        -> Result<bool, StoreError>;
}
