//! LMDB environment setup.

use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};
use tracing::info;

use crate::{LmdbChallengeStore, LmdbError, LmdbIdentityStore};

/// Number of named databases opened by [`LmdbEnvironment::open`].
const DATABASE_COUNT: u32 = 5;

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    env: Arc<Env>,
    identities_db: Database<Bytes, Bytes>,
    identity_names_db: Database<Bytes, Bytes>,
    identity_keys_db: Database<Bytes, Bytes>,
    chain_links_db: Database<Bytes, Bytes>,
    challenges_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given directory.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;
        // SAFETY: the environment directory is owned by this process; no other
        // handle to the same path is opened concurrently.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(DATABASE_COUNT)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let identities_db = env.create_database(&mut wtxn, Some("identities"))?;
        let identity_names_db = env.create_database(&mut wtxn, Some("identity_names"))?;
        let identity_keys_db = env.create_database(&mut wtxn, Some("identity_keys"))?;
        let chain_links_db = env.create_database(&mut wtxn, Some("chain_links"))?;
        let challenges_db = env.create_database(&mut wtxn, Some("challenges"))?;
        wtxn.commit()?;

        info!(path = %path.display(), map_size, "opened LMDB environment");

        Ok(Self {
            env: Arc::new(env),
            identities_db,
            identity_names_db,
            identity_keys_db,
            chain_links_db,
            challenges_db,
        })
    }

    pub fn identity_store(&self) -> LmdbIdentityStore {
        LmdbIdentityStore {
            env: self.env.clone(),
            identities_db: self.identities_db,
            identity_names_db: self.identity_names_db,
            identity_keys_db: self.identity_keys_db,
            chain_links_db: self.chain_links_db,
        }
    }

    pub fn challenge_store(&self) -> LmdbChallengeStore {
        LmdbChallengeStore {
            env: self.env.clone(),
            challenges_db: self.challenges_db,
        }
    }
}
