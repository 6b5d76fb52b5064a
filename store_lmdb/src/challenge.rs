//! LMDB implementation of ChallengeStore, keyed by identity id.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use shellbook_store::{ChallengeId, ChallengeRecord, ChallengeStore, StoreError};
use shellbook_types::IdentityId;

use crate::LmdbError;

pub struct LmdbChallengeStore {
    pub(crate) env: Arc<Env>,
    pub(crate) challenges_db: Database<Bytes, Bytes>,
}

impl ChallengeStore for LmdbChallengeStore {
    fn put_challenge(&self, record: &ChallengeRecord) -> Result<(), StoreError> {
        let bytes = bincode::serialize(record).map_err(LmdbError::from)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.challenges_db
            .put(&mut wtxn, record.identity.as_bytes(), &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_challenge(&self, identity: &IdentityId) -> Result<Option<ChallengeRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        match self
            .challenges_db
            .get(&rtxn, identity.as_bytes())
            .map_err(LmdbError::from)?
        {
            Some(bytes) => {
                let record = bincode::deserialize(bytes).map_err(LmdbError::from)?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    fn delete_challenge(
        &self,
        identity: &IdentityId,
        id: &ChallengeId,
    ) -> Result<bool, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let current: Option<ChallengeRecord> = match self
            .challenges_db
            .get(&wtxn, identity.as_bytes())
            .map_err(LmdbError::from)?
        {
            Some(bytes) => Some(bincode::deserialize(bytes).map_err(LmdbError::from)?),
            None => None,
        };
        match current {
            Some(record) if record.id == *id => {
                self.challenges_db
                    .delete(&mut wtxn, identity.as_bytes())
                    .map_err(LmdbError::from)?;
                wtxn.commit().map_err(LmdbError::from)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
