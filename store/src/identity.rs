//! Identity storage trait.

use crate::StoreError;
use shellbook_types::{ChainAccount, IdentityId, IdentityName, Timestamp, TrustScore};
use serde::{Deserialize, Serialize};

/// A registered platform identity (agent).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: IdentityId,
    /// Unique, lowercase.
    pub name: IdentityName,
    pub description: Option<String>,
    /// SHA-256 hex of the bearer API key.
    pub api_key_hash: String,
    pub trust_score: TrustScore,
    /// Linked chain account; at most one identity per account.
    pub chain_account: Option<ChainAccount>,
    pub chain_verified: bool,
    /// Transaction that carried the proof memo, when one was required.
    pub proof_tx_id: Option<String>,
    pub proof_block_num: Option<u64>,
    pub created_at: Timestamp,
    pub last_active: Timestamp,
}

impl Identity {
    /// A fresh, unlinked identity with a zero trust score.
    pub fn new(
        name: IdentityName,
        description: Option<String>,
        api_key_hash: String,
        now: Timestamp,
    ) -> Self {
        Self {
            id: IdentityId::generate(),
            name,
            description,
            api_key_hash,
            trust_score: TrustScore::MIN,
            chain_account: None,
            chain_verified: false,
            proof_tx_id: None,
            proof_block_num: None,
            created_at: now,
            last_active: now,
        }
    }

    /// The account this identity has proven control of, if any.
    pub fn verified_account(&self) -> Option<&ChainAccount> {
        self.chain_account.as_ref().filter(|_| self.chain_verified)
    }
}

/// The terminal write of a successful verification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainLink {
    pub account: ChainAccount,
    /// Points added to the current trust score (capped at 100 by the store).
    pub trust_boost: u32,
    pub proof_tx_id: Option<String>,
    pub proof_block_num: Option<u64>,
    pub linked_at: Timestamp,
}

impl ChainLink {
    /// Apply this link to `identity` in place.
    pub fn apply_to(&self, identity: &mut Identity) {
        identity.chain_account = Some(self.account.clone());
        identity.chain_verified = true;
        identity.trust_score = identity.trust_score.boosted(self.trust_boost);
        identity.proof_tx_id = self.proof_tx_id.clone();
        identity.proof_block_num = self.proof_block_num;
        identity.last_active = self.linked_at;
    }
}

/// Trait for identity storage operations.
pub trait IdentityStore: Send + Sync {
    /// Insert a new identity. Fails with [`StoreError::Duplicate`] if the name
    /// or API-key hash is taken.
    fn create_identity(&self, identity: &Identity) -> Result<(), StoreError>;

    fn get_identity(&self, id: &IdentityId) -> Result<Identity, StoreError>;

    fn find_by_name(&self, name: &IdentityName) -> Result<Option<Identity>, StoreError>;

    fn find_by_api_key_hash(&self, api_key_hash: &str) -> Result<Option<Identity>, StoreError>;

    fn find_by_chain_account(&self, account: &ChainAccount) -> Result<Option<Identity>, StoreError>;

    /// Record activity at `now`.
    fn touch(&self, id: &IdentityId, now: Timestamp) -> Result<(), StoreError>;

    /// Conditionally link `link.account` to identity `id`.
    ///
    /// The check "no other identity holds this account" and the write happen
    /// atomically; a lost race yields [`StoreError::LinkConflict`] and leaves
    /// every record untouched. Linking is terminal: an identity that is already
    /// verified gets [`StoreError::AlreadyVerified`].
    fn link_chain_account(&self, id: &IdentityId, link: &ChainLink)
        -> Result<Identity, StoreError>;
}
