//! Nullable agent registry.

use async_trait::async_trait;
use shellbook_registry::{RegistryAgent, RegistryError, RegistryLookup};
use shellbook_types::ChainAccount;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// An in-memory [`RegistryLookup`] mapping accounts to trust totals.
pub struct NullRegistry {
    agents: Mutex<HashMap<String, f64>>,
    unreachable: AtomicBool,
}

impl NullRegistry {
    pub fn new() -> Self {
        Self {
            agents: Mutex::new(HashMap::new()),
            unreachable: AtomicBool::new(false),
        }
    }

    /// Register `account` with the given trust total.
    pub fn register(&self, account: &ChainAccount, trust_total: f64) {
        self.agents
            .lock()
            .unwrap()
            .insert(account.to_string(), trust_total);
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    fn check_reachable(&self) -> Result<(), RegistryError> {
        if self.unreachable.load(Ordering::SeqCst) {
            Err(RegistryError::Unreachable("null registry offline".to_string()))
        } else {
            Ok(())
        }
    }
}

impl Default for NullRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RegistryLookup for NullRegistry {
    async fn get_agent(
        &self,
        account: &ChainAccount,
    ) -> Result<Option<RegistryAgent>, RegistryError> {
        self.check_reachable()?;
        Ok(self
            .agents
            .lock()
            .unwrap()
            .contains_key(account.as_str())
            .then(|| RegistryAgent {
                account: account.to_string(),
                name: account.to_string(),
                active: Some(true),
                extra: Default::default(),
            }))
    }

    async fn get_trust_score(&self, account: &ChainAccount) -> Result<Option<f64>, RegistryError> {
        self.check_reachable()?;
        Ok(self.agents.lock().unwrap().get(account.as_str()).copied())
    }
}
