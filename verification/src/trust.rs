//! Trust boost awarded on a successful link.

use shellbook_registry::RegistryStanding;

/// Awarded for any verified link.
pub const BASE_TRUST_BOOST: u32 = 10;
/// Upper bound of the registry-derived part.
pub const REGISTRY_TRUST_RANGE: u32 = 40;

/// `10 + floor(score / 100 * 40)` for registered accounts, `10` otherwise.
///
/// Always within `[10, 50]`.
pub fn compute_trust_boost(standing: &RegistryStanding) -> u32 {
    if !standing.in_registry {
        return BASE_TRUST_BOOST;
    }
    let score = standing.trust_score.clamp(0.0, 100.0);
    BASE_TRUST_BOOST + (score / 100.0 * f64::from(REGISTRY_TRUST_RANGE)).floor() as u32
}
