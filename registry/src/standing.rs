use async_trait::async_trait;
use tracing::{debug, warn};

use shellbook_types::ChainAccount;

use crate::{RegistryAgent, RegistryError, RegistryStanding};

/// Source of registry data for a chain account.
#[async_trait]
pub trait RegistryLookup: Send + Sync {
    /// `Ok(None)` when the account is not registered.
    async fn get_agent(&self, account: &ChainAccount)
        -> Result<Option<RegistryAgent>, RegistryError>;

    /// `Ok(None)` when the registry has no trust record.
    async fn get_trust_score(&self, account: &ChainAccount) -> Result<Option<f64>, RegistryError>;
}

/// Best-effort registry standing. Errors degrade to [`RegistryStanding::ABSENT`].
pub async fn lookup_standing(
    registry: &dyn RegistryLookup,
    account: &ChainAccount,
) -> RegistryStanding {
    let agent = match registry.get_agent(account).await {
        Ok(Some(agent)) => agent,
        Ok(None) => {
            debug!(account = %account, "account not in agent registry");
            return RegistryStanding::ABSENT;
        }
        Err(e) => {
            warn!(account = %account, error = %e, "agent registry lookup failed");
            return RegistryStanding::ABSENT;
        }
    };

    match registry.get_trust_score(account).await {
        Ok(total) => RegistryStanding::registered(total.unwrap_or(0.0)).with_agent(agent),
        Err(e) => {
            warn!(account = %account, error = %e, "agent trust lookup failed");
            RegistryStanding::ABSENT
        }
    }
}

/// Registry stand-in for deployments without one: every account is unregistered.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoRegistry;

#[async_trait]
impl RegistryLookup for NoRegistry {
    async fn get_agent(
        &self,
        _account: &ChainAccount,
    ) -> Result<Option<RegistryAgent>, RegistryError> {
        Ok(None)
    }

    async fn get_trust_score(&self, _account: &ChainAccount) -> Result<Option<f64>, RegistryError> {
        Ok(None)
    }
}
