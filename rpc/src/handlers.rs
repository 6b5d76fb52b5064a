//! Request handlers and their JSON shapes.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use shellbook_crypto::{generate_api_key, hash_api_key};
use shellbook_registry::RegistryAgent;
use shellbook_store::{Identity, StoreError};
use shellbook_types::IdentityName;
use shellbook_utils::format_remaining;
use shellbook_verification::{LinkPhase, ProofSubmission};

use crate::auth::Authenticated;
use crate::error::ApiError;
use crate::server::AppState;

/// Unwrap a JSON body, turning any extractor rejection into a 400.
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(inner)| inner)
        .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {}", e.body_text())))
}

// ── Identity ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Serialize)]
pub struct AgentView {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub trust_score: u8,
    pub chain_account: Option<String>,
    pub chain_verified: bool,
    pub proof_tx_id: Option<String>,
    pub proof_block_num: Option<u64>,
    pub created_at: String,
    pub last_active: String,
}

impl From<&Identity> for AgentView {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id.to_string(),
            name: identity.name.to_string(),
            description: identity.description.clone(),
            trust_score: identity.trust_score.value(),
            chain_account: identity.chain_account.as_ref().map(|a| a.to_string()),
            chain_verified: identity.chain_verified,
            proof_tx_id: identity.proof_tx_id.clone(),
            proof_block_num: identity.proof_block_num,
            created_at: identity.created_at.to_rfc3339(),
            last_active: identity.last_active.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub agent: AgentView,
    pub api_key: String,
    pub message: String,
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let request = body(payload)?;
    let raw_name = request
        .name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::BadRequest("name is required".to_string()))?;
    let name = IdentityName::parse(&raw_name).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let description = request.description.filter(|d| !d.trim().is_empty());

    let api_key = generate_api_key();
    let identity = Identity::new(name, description, hash_api_key(&api_key), state.clock.now());
    match state.identities.create_identity(&identity) {
        Ok(()) => {}
        Err(StoreError::Duplicate(_)) => {
            return Err(ApiError::Conflict("Name already taken".to_string()))
        }
        Err(e) => return Err(e.into()),
    }
    state.metrics.identities_registered.inc();
    info!(identity = %identity.id, name = %identity.name, "identity registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            agent: AgentView::from(&identity),
            api_key,
            message: "Save your API key. It cannot be retrieved later.".to_string(),
        }),
    ))
}

pub async fn me(Authenticated(identity): Authenticated) -> Json<AgentView> {
    Json(AgentView::from(&identity))
}

// ── Verification ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ChallengeRequest {
    #[serde(alias = "xpr_account")]
    pub chain_account: Option<String>,
}

#[derive(Serialize)]
pub struct ChallengeResponse {
    pub challenge: String,
    pub chain_account: String,
    pub expires_at: String,
    pub expires_in: u64,
    pub message: String,
}

pub async fn request_challenge(
    State(state): State<Arc<AppState>>,
    Authenticated(identity): Authenticated,
    payload: Result<Json<ChallengeRequest>, JsonRejection>,
) -> Result<Json<ChallengeResponse>, ApiError> {
    let request = body(payload)?;
    let issued = state.orchestrator.request_challenge(
        &identity.id,
        request.chain_account.as_deref(),
        state.clock.now(),
    )?;
    state.metrics.challenges_issued.inc();

    let message = if state.orchestrator.config().require_transaction_proof {
        "Sign this challenge with a key on the account, send a token transfer from the account \
         with the challenge in its memo, then POST { chain_account, signature, tx_id } to \
         /api/v1/agents/verify-xpr"
    } else {
        "Sign this challenge with a key on the account and POST { chain_account, signature } \
         to /api/v1/agents/verify-xpr"
    };
    Ok(Json(ChallengeResponse {
        challenge: issued.challenge,
        chain_account: issued.chain_account.to_string(),
        expires_at: issued.expires_at.to_rfc3339(),
        expires_in: issued.expires_in,
        message: format!("{message}. Expires in {}.", format_remaining(issued.expires_in)),
    }))
}

#[derive(Deserialize)]
pub struct ProofRequest {
    #[serde(alias = "xpr_account")]
    pub chain_account: Option<String>,
    pub signature: Option<String>,
    pub tx_id: Option<String>,
}

#[derive(Serialize)]
pub struct ProofResponse {
    pub verified: bool,
    pub chain_account: String,
    pub tx_id: Option<String>,
    pub block_num: Option<u64>,
    pub in_registry: bool,
    pub registry_trust_score: f64,
    /// Registry entry for the linked account, when it has one.
    pub xpr_agent: Option<RegistryAgent>,
    pub trust_boost: u32,
    pub new_trust_score: u8,
    pub permission: Option<String>,
    pub message: String,
}

pub async fn submit_proof(
    State(state): State<Arc<AppState>>,
    Authenticated(identity): Authenticated,
    payload: Result<Json<ProofRequest>, JsonRejection>,
) -> Result<Json<ProofResponse>, ApiError> {
    let started = Instant::now();
    let result = match body(payload) {
        Ok(request) => {
            let proof = ProofSubmission {
                chain_account: request.chain_account,
                signature: request.signature,
                tx_id: request.tx_id,
            };
            state
                .orchestrator
                .submit_proof(&identity.id, &proof, state.clock.now())
                .await
                .map_err(|e| {
                    state
                        .metrics
                        .proofs_rejected
                        .with_label_values(&[e.kind().as_str()])
                        .inc();
                    ApiError::from(e)
                })
        }
        Err(e) => {
            state
                .metrics
                .proofs_rejected
                .with_label_values(&["validation"])
                .inc();
            Err(e)
        }
    };
    state
        .metrics
        .proof_latency_seconds
        .observe(started.elapsed().as_secs_f64());

    let outcome = result?;
    state.metrics.proofs_accepted.inc();
    Ok(Json(ProofResponse {
        verified: true,
        chain_account: outcome.chain_account.to_string(),
        message: format!(
            "Verified! XPR account @{} linked. Trust score boosted by {} points.",
            outcome.chain_account, outcome.trust_boost
        ),
        tx_id: outcome.tx_id,
        block_num: outcome.block_num,
        in_registry: outcome.standing.in_registry,
        registry_trust_score: outcome.standing.trust_score,
        xpr_agent: outcome.standing.agent,
        trust_boost: outcome.trust_boost,
        new_trust_score: outcome.new_trust_score.value(),
        permission: outcome.permission,
    }))
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub phase: LinkPhase,
    pub chain_account: Option<String>,
    pub chain_verified: bool,
    pub trust_score: u8,
    pub pending_challenge_expires_at: Option<String>,
}

pub async fn verification_status(
    State(state): State<Arc<AppState>>,
    Authenticated(identity): Authenticated,
) -> Result<Json<StatusResponse>, ApiError> {
    let status = state.orchestrator.status(&identity.id, state.clock.now())?;
    Ok(Json(StatusResponse {
        phase: status.phase,
        chain_account: status.chain_account.map(|a| a.to_string()),
        chain_verified: status.chain_verified,
        trust_score: status.trust_score.value(),
        pending_challenge_expires_at: status.pending_challenge_expires_at.map(|t| t.to_rfc3339()),
    }))
}

// ── Metrics ──────────────────────────────────────────────────────────────

pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.encode(),
    )
}
