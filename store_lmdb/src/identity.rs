//! LMDB implementation of IdentityStore.
//!
//! Records live in `identities` keyed by the 16-byte identity id. Three
//! secondary indexes map a unique attribute back to that id:
//! `identity_names` (lowercase name), `identity_keys` (API-key hash) and
//! `chain_links` (linked chain account).

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, RoTxn};
use tracing::debug;
use uuid::Uuid;

use shellbook_store::{ChainLink, Identity, IdentityStore, StoreError};
use shellbook_types::{ChainAccount, IdentityId, IdentityName, Timestamp};

use crate::LmdbError;

pub struct LmdbIdentityStore {
    pub(crate) env: Arc<Env>,
    pub(crate) identities_db: Database<Bytes, Bytes>,
    pub(crate) identity_names_db: Database<Bytes, Bytes>,
    pub(crate) identity_keys_db: Database<Bytes, Bytes>,
    pub(crate) chain_links_db: Database<Bytes, Bytes>,
}

fn decode_id(bytes: &[u8]) -> Result<IdentityId, LmdbError> {
    Uuid::from_slice(bytes)
        .map(IdentityId::from_uuid)
        .map_err(|e| LmdbError::CorruptIndex(e.to_string()))
}

impl LmdbIdentityStore {
    fn read_identity(&self, txn: &RoTxn, id: &IdentityId) -> Result<Option<Identity>, LmdbError> {
        match self.identities_db.get(txn, id.as_bytes())? {
            Some(bytes) => Ok(Some(bincode::deserialize(bytes)?)),
            None => Ok(None),
        }
    }

    /// Resolve a secondary index entry to its identity.
    fn find_via(
        &self,
        index: &Database<Bytes, Bytes>,
        key: &[u8],
    ) -> Result<Option<Identity>, LmdbError> {
        let rtxn = self.env.read_txn()?;
        let Some(id_bytes) = index.get(&rtxn, key)? else {
            return Ok(None);
        };
        let id = decode_id(id_bytes)?;
        self.read_identity(&rtxn, &id)
    }
}

impl IdentityStore for LmdbIdentityStore {
    fn create_identity(&self, identity: &Identity) -> Result<(), StoreError> {
        let name_key = identity.name.as_str().as_bytes();
        let hash_key = identity.api_key_hash.as_bytes();
        let bytes = bincode::serialize(identity).map_err(LmdbError::from)?;

        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        if self
            .identity_names_db
            .get(&wtxn, name_key)
            .map_err(LmdbError::from)?
            .is_some()
        {
            return Err(StoreError::Duplicate(format!("name {}", identity.name)));
        }
        if self
            .identity_keys_db
            .get(&wtxn, hash_key)
            .map_err(LmdbError::from)?
            .is_some()
        {
            return Err(StoreError::Duplicate("api key".to_string()));
        }

        let id_key = identity.id.as_bytes();
        self.identities_db
            .put(&mut wtxn, id_key, &bytes)
            .map_err(LmdbError::from)?;
        self.identity_names_db
            .put(&mut wtxn, name_key, id_key)
            .map_err(LmdbError::from)?;
        self.identity_keys_db
            .put(&mut wtxn, hash_key, id_key)
            .map_err(LmdbError::from)?;
        if let Some(account) = &identity.chain_account {
            self.chain_links_db
                .put(&mut wtxn, account.as_str().as_bytes(), id_key)
                .map_err(LmdbError::from)?;
        }
        wtxn.commit().map_err(LmdbError::from)?;
        debug!(identity = %identity.id, name = %identity.name, "identity created");
        Ok(())
    }

    fn get_identity(&self, id: &IdentityId) -> Result<Identity, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        self.read_identity(&rtxn, id)?
            .ok_or_else(|| StoreError::NotFound(format!("identity {id}")))
    }

    fn find_by_name(&self, name: &IdentityName) -> Result<Option<Identity>, StoreError> {
        Ok(self.find_via(&self.identity_names_db, name.as_str().as_bytes())?)
    }

    fn find_by_api_key_hash(&self, api_key_hash: &str) -> Result<Option<Identity>, StoreError> {
        Ok(self.find_via(&self.identity_keys_db, api_key_hash.as_bytes())?)
    }

    fn find_by_chain_account(
        &self,
        account: &ChainAccount,
    ) -> Result<Option<Identity>, StoreError> {
        Ok(self.find_via(&self.chain_links_db, account.as_str().as_bytes())?)
    }

    fn touch(&self, id: &IdentityId, now: Timestamp) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let mut identity = self
            .read_identity(&wtxn, id)?
            .ok_or_else(|| StoreError::NotFound(format!("identity {id}")))?;
        identity.last_active = now;
        let bytes = bincode::serialize(&identity).map_err(LmdbError::from)?;
        self.identities_db
            .put(&mut wtxn, id.as_bytes(), &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn link_chain_account(
        &self,
        id: &IdentityId,
        link: &ChainLink,
    ) -> Result<Identity, StoreError> {
        let account_key = link.account.as_str().as_bytes();

        // LMDB allows a single writer at a time, so the check below and the
        // writes that follow cannot interleave with another link attempt.
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let holder = self
            .chain_links_db
            .get(&wtxn, account_key)
            .map_err(LmdbError::from)?
            .map(decode_id)
            .transpose()?;
        if let Some(holder) = holder {
            if holder != *id {
                return Err(StoreError::LinkConflict {
                    account: link.account.clone(),
                    holder,
                });
            }
        }

        let mut identity = self
            .read_identity(&wtxn, id)?
            .ok_or_else(|| StoreError::NotFound(format!("identity {id}")))?;
        if let Some(account) = identity.verified_account() {
            return Err(StoreError::AlreadyVerified {
                id: *id,
                account: account.clone(),
            });
        }
        link.apply_to(&mut identity);

        let bytes = bincode::serialize(&identity).map_err(LmdbError::from)?;
        self.identities_db
            .put(&mut wtxn, id.as_bytes(), &bytes)
            .map_err(LmdbError::from)?;
        self.chain_links_db
            .put(&mut wtxn, account_key, id.as_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        debug!(identity = %id, account = %link.account, "chain account linked");
        Ok(identity)
    }
}
