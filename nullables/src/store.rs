//! Nullable store: thread-safe in-memory storage for testing.

use shellbook_store::{
    ChainLink, ChallengeId, ChallengeRecord, ChallengeStore, Identity, IdentityStore, StoreError,
};
use shellbook_types::{ChainAccount, IdentityId, IdentityName, Timestamp};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
struct State {
    identities: HashMap<IdentityId, Identity>,
    names: HashMap<String, IdentityId>,
    api_keys: HashMap<String, IdentityId>,
    links: HashMap<String, IdentityId>,
    challenges: HashMap<IdentityId, ChallengeRecord>,
}

/// An in-memory identity + challenge store for testing.
///
/// One mutex guards everything, so the link check and write are atomic.
/// Thread-safe for use with tokio's multi-threaded runtime.
pub struct NullStore {
    state: Mutex<State>,
}

impl NullStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
        }
    }

    pub fn identity_count(&self) -> usize {
        self.state.lock().unwrap().identities.len()
    }
}

impl Default for NullStore {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityStore for NullStore {
    fn create_identity(&self, identity: &Identity) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        if state.names.contains_key(identity.name.as_str()) {
            return Err(StoreError::Duplicate(format!("name {}", identity.name)));
        }
        if state.api_keys.contains_key(&identity.api_key_hash) {
            return Err(StoreError::Duplicate("api key".to_string()));
        }
        state
            .names
            .insert(identity.name.as_str().to_string(), identity.id);
        state
            .api_keys
            .insert(identity.api_key_hash.clone(), identity.id);
        if let Some(account) = &identity.chain_account {
            state.links.insert(account.to_string(), identity.id);
        }
        state.identities.insert(identity.id, identity.clone());
        Ok(())
    }

    fn get_identity(&self, id: &IdentityId) -> Result<Identity, StoreError> {
        self.state
            .lock()
            .unwrap()
            .identities
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("identity {id}")))
    }

    fn find_by_name(&self, name: &IdentityName) -> Result<Option<Identity>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .names
            .get(name.as_str())
            .and_then(|id| state.identities.get(id))
            .cloned())
    }

    fn find_by_api_key_hash(&self, api_key_hash: &str) -> Result<Option<Identity>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .api_keys
            .get(api_key_hash)
            .and_then(|id| state.identities.get(id))
            .cloned())
    }

    fn find_by_chain_account(
        &self,
        account: &ChainAccount,
    ) -> Result<Option<Identity>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .links
            .get(account.as_str())
            .and_then(|id| state.identities.get(id))
            .cloned())
    }

    fn touch(&self, id: &IdentityId, now: Timestamp) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        let identity = state
            .identities
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("identity {id}")))?;
        identity.last_active = now;
        Ok(())
    }

    fn link_chain_account(
        &self,
        id: &IdentityId,
        link: &ChainLink,
    ) -> Result<Identity, StoreError> {
        let mut state = self.state.lock().unwrap();
        if let Some(holder) = state.links.get(link.account.as_str()) {
            if holder != id {
                return Err(StoreError::LinkConflict {
                    account: link.account.clone(),
                    holder: *holder,
                });
            }
        }

        let identity = state
            .identities
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("identity {id}")))?;
        if let Some(account) = identity.verified_account() {
            return Err(StoreError::AlreadyVerified {
                id: *id,
                account: account.clone(),
            });
        }
        link.apply_to(identity);
        let updated = identity.clone();
        state.links.insert(link.account.to_string(), *id);
        Ok(updated)
    }
}

impl ChallengeStore for NullStore {
    fn put_challenge(&self, record: &ChallengeRecord) -> Result<(), StoreError> {
        self.state
            .lock()
            .unwrap()
            .challenges
            .insert(record.identity, record.clone());
        Ok(())
    }

    fn get_challenge(&self, identity: &IdentityId) -> Result<Option<ChallengeRecord>, StoreError> {
        Ok(self.state.lock().unwrap().challenges.get(identity).cloned())
    }

    fn delete_challenge(
        &self,
        identity: &IdentityId,
        id: &ChallengeId,
    ) -> Result<bool, StoreError> {
        let mut state = self.state.lock().unwrap();
        match state.challenges.get(identity) {
            Some(record) if record.id == *id => {
                state.challenges.remove(identity);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
