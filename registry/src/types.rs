//! Registry response types.

use serde::{Deserialize, Serialize};

/// A registered agent as returned by `GET /agents/{account}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegistryAgent {
    pub account: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub active: Option<bool>,
    /// Remaining fields, passed through to the proof response.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// `GET /agents/{account}/trust`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrustBreakdown {
    pub total: f64,
}

/// What verification needs to know about an account's registry entry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RegistryStanding {
    pub in_registry: bool,
    /// Registry trust total clamped to 0..=100; 0 when not registered.
    pub trust_score: f64,
    pub agent: Option<RegistryAgent>,
}

impl RegistryStanding {
    pub const ABSENT: Self = Self {
        in_registry: false,
        trust_score: 0.0,
        agent: None,
    };

    pub fn registered(total: f64) -> Self {
        let trust_score = if total.is_finite() {
            total.clamp(0.0, 100.0)
        } else {
            0.0
        };
        Self {
            in_registry: true,
            trust_score,
            agent: None,
        }
    }

    pub fn with_agent(mut self, agent: RegistryAgent) -> Self {
        self.agent = Some(agent);
        self
    }
}
