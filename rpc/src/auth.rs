//! Bearer API-key authentication.

use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::{debug, warn};

use shellbook_crypto::hash_api_key;
use shellbook_store::Identity;

use crate::error::ApiError;
use crate::server::AppState;

/// The identity behind `Authorization: Bearer <api key>`.
///
/// Extraction records activity on the identity; a failure to do so is logged
/// and does not fail the request.
pub struct Authenticated(pub Identity);

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(ApiError::Unauthorized)?;
        let identity = state
            .identities
            .find_by_api_key_hash(&hash_api_key(token))?
            .ok_or_else(|| {
                debug!("unknown api key");
                ApiError::Unauthorized
            })?;

        if let Err(e) = state.identities.touch(&identity.id, state.clock.now()) {
            warn!(identity = %identity.id, error = %e, "failed to record activity");
        }
        Ok(Authenticated(identity))
    }
}
