//! Axum-based HTTP server.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use shellbook_store::IdentityStore;
use shellbook_types::Clock;
use shellbook_verification::VerificationOrchestrator;

use crate::handlers;
use crate::metrics::ApiMetrics;

/// Shared state handed to every handler.
pub struct AppState {
    pub orchestrator: VerificationOrchestrator,
    pub identities: Arc<dyn IdentityStore>,
    pub clock: Arc<dyn Clock>,
    pub metrics: Arc<ApiMetrics>,
}

/// Build the application router.
///
/// API routes live under `/api/v1`; `/metrics` sits at the root when enabled.
pub fn router(state: Arc<AppState>, enable_metrics: bool) -> Router {
    let api = Router::new()
        .route("/agents/register", post(handlers::register))
        .route("/agents/me", get(handlers::me))
        .route(
            "/agents/verify-xpr/challenge",
            post(handlers::request_challenge),
        )
        .route("/agents/verify-xpr", post(handlers::submit_proof))
        .route(
            "/agents/verify-xpr/status",
            get(handlers::verification_status),
        );

    let mut app = Router::new().nest("/api/v1", api);
    if enable_metrics {
        app = app.route("/metrics", get(handlers::metrics));
    }
    app.layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub struct RpcServer {
    pub addr: SocketAddr,
    pub enable_metrics: bool,
    state: Arc<AppState>,
}

impl RpcServer {
    pub fn new(addr: SocketAddr, state: Arc<AppState>, enable_metrics: bool) -> Self {
        Self {
            addr,
            enable_metrics,
            state,
        }
    }

    /// Serve until `shutdown` resolves.
    pub async fn start<F>(&self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = router(self.state.clone(), self.enable_metrics);
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        info!(addr = %self.addr, "HTTP API listening");
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use k256::ecdsa::SigningKey;
    use serde_json::{json, Value};
    use shellbook_crypto::{sha256, sign_digest, PublicKey};
    use shellbook_ledger::{Action, ActionTrace, ChainTransaction};
    use shellbook_nullables::{NullClock, NullLedger, NullRandom, NullRegistry, NullStore};
    use shellbook_types::ChainAccount;
    use shellbook_verification::VerificationConfig;
    use tower::ServiceExt;

    struct TestApp {
        router: Router,
        clock: Arc<NullClock>,
        ledger: Arc<NullLedger>,
        registry: Arc<NullRegistry>,
    }

    fn app(config: VerificationConfig) -> TestApp {
        let store = Arc::new(NullStore::new());
        let ledger = Arc::new(NullLedger::new());
        let registry = Arc::new(NullRegistry::new());
        let clock = Arc::new(NullClock::new(1_700_000_000));
        let orchestrator = VerificationOrchestrator::new(
            store.clone(),
            store.clone(),
            Arc::new(NullRandom::new(3)),
            ledger.clone(),
            registry.clone(),
            config,
        );
        let state = Arc::new(AppState {
            orchestrator,
            identities: store,
            clock: clock.clone(),
            metrics: Arc::new(ApiMetrics::new()),
        });
        TestApp {
            router: router(state, true),
            clock,
            ledger,
            registry,
        }
    }

    fn signature_only() -> VerificationConfig {
        VerificationConfig {
            require_transaction_proof: false,
            ..VerificationConfig::default()
        }
    }

    async fn call(
        router: &Router,
        method: &str,
        uri: &str,
        api_key: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(key) = api_key {
            request = request.header("authorization", format!("Bearer {key}"));
        }
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn register(router: &Router, name: &str) -> String {
        let (status, body) = call(
            router,
            "POST",
            "/api/v1/agents/register",
            None,
            Some(json!({ "name": name })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["api_key"].as_str().unwrap().to_string()
    }

    fn key_on_chain(ledger: &NullLedger, account: &str, seed: u8) -> SigningKey {
        let key = SigningKey::from_bytes((&[seed; 32]).into()).unwrap();
        let public = PublicKey::from_verifying_key(key.verifying_key());
        ledger.add_account(
            &ChainAccount::parse(account).unwrap(),
            &[("active", public.to_legacy_string())],
        );
        key
    }

    fn sign(key: &SigningKey, challenge: &str) -> String {
        sign_digest(key, &sha256(challenge.as_bytes())).unwrap().to_string()
    }

    #[tokio::test]
    async fn register_then_me() {
        let t = app(signature_only());
        let key = register(&t.router, "Alice").await;

        let (status, body) = call(&t.router, "GET", "/api/v1/agents/me", Some(key.as_str()), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "alice");
        assert_eq!(body["trust_score"], 0);
        assert_eq!(body["chain_verified"], false);

        let (status, _) = call(
            &t.router,
            "POST",
            "/api/v1/agents/register",
            None,
            Some(json!({ "name": "ALICE" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn bad_names_and_bodies_are_400() {
        let t = app(signature_only());
        for body in [json!({ "name": "a" }), json!({ "name": "has space" }), json!({})] {
            let (status, _) =
                call(&t.router, "POST", "/api/v1/agents/register", None, Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn missing_or_unknown_key_is_401() {
        let t = app(signature_only());
        let (status, body) = call(
            &t.router,
            "POST",
            "/api/v1/agents/verify-xpr/challenge",
            None,
            Some(json!({ "chain_account": "alicex" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Unauthorized");

        let (status, _) =
            call(&t.router, "GET", "/api/v1/agents/me", Some("sb_nope"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn full_signature_flow_links_account() {
        let t = app(signature_only());
        let api_key = register(&t.router, "alice").await;
        let signer = key_on_chain(&t.ledger, "alicex", 21);
        t.registry
            .register(&ChainAccount::parse("alicex").unwrap(), 80.0);

        let (status, issued) = call(
            &t.router,
            "POST",
            "/api/v1/agents/verify-xpr/challenge",
            Some(api_key.as_str()),
            Some(json!({ "xpr_account": "alicex" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{issued}");
        assert_eq!(issued["expires_in"], 300);
        assert_eq!(issued["chain_account"], "alicex");
        let challenge = issued["challenge"].as_str().unwrap();
        assert!(challenge.starts_with("shellbook-verify:"));

        let (_, status_body) = call(
            &t.router,
            "GET",
            "/api/v1/agents/verify-xpr/status",
            Some(api_key.as_str()),
            None,
        )
        .await;
        assert_eq!(status_body["phase"], "challenge_issued");

        let (status, linked) = call(
            &t.router,
            "POST",
            "/api/v1/agents/verify-xpr",
            Some(api_key.as_str()),
            Some(json!({ "chain_account": "alicex", "signature": sign(&signer, challenge) })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{linked}");
        assert_eq!(linked["verified"], true);
        assert_eq!(linked["trust_boost"], 42);
        assert_eq!(linked["new_trust_score"], 42);
        assert_eq!(linked["in_registry"], true);
        assert_eq!(linked["registry_trust_score"], 80.0);
        assert_eq!(linked["xpr_agent"]["account"], "alicex");
        assert_eq!(linked["permission"], "active");

        let (status, again) = call(
            &t.router,
            "POST",
            "/api/v1/agents/verify-xpr/challenge",
            Some(api_key.as_str()),
            Some(json!({ "chain_account": "alicex" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT, "{again}");
        assert!(again["error"].as_str().unwrap().contains("already verified"));

        let (_, me) = call(&t.router, "GET", "/api/v1/agents/me", Some(api_key.as_str()), None).await;
        assert_eq!(me["chain_account"], "alicex");
        assert_eq!(me["chain_verified"], true);

        let (status, metrics) = {
            let request = Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap();
            let response = t.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            (status, String::from_utf8(bytes.to_vec()).unwrap())
        };
        assert_eq!(status, StatusCode::OK);
        assert!(metrics.contains("shellbook_proofs_accepted_total 1"));
    }

    #[tokio::test]
    async fn second_identity_gets_409_for_linked_account() {
        let t = app(signature_only());
        let alice = register(&t.router, "alice").await;
        let bob = register(&t.router, "bob").await;
        let signer = key_on_chain(&t.ledger, "alicex", 22);

        let (_, issued) = call(
            &t.router,
            "POST",
            "/api/v1/agents/verify-xpr/challenge",
            Some(alice.as_str()),
            Some(json!({ "chain_account": "alicex" })),
        )
        .await;
        let challenge = issued["challenge"].as_str().unwrap();
        let (status, _) = call(
            &t.router,
            "POST",
            "/api/v1/agents/verify-xpr",
            Some(alice.as_str()),
            Some(json!({ "chain_account": "alicex", "signature": sign(&signer, challenge) })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(
            &t.router,
            "POST",
            "/api/v1/agents/verify-xpr/challenge",
            Some(bob.as_str()),
            Some(json!({ "chain_account": "alicex" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].as_str().unwrap().contains("alice"));
    }

    #[tokio::test]
    async fn proof_error_statuses() {
        let t = app(signature_only());
        let api_key = register(&t.router, "carol").await;
        let signer = key_on_chain(&t.ledger, "carolx", 23);

        // No challenge yet.
        let (status, _) = call(
            &t.router,
            "POST",
            "/api/v1/agents/verify-xpr",
            Some(api_key.as_str()),
            Some(json!({ "chain_account": "carolx", "signature": "SIG_K1_x" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, issued) = call(
            &t.router,
            "POST",
            "/api/v1/agents/verify-xpr/challenge",
            Some(api_key.as_str()),
            Some(json!({ "chain_account": "carolx" })),
        )
        .await;
        let challenge = issued["challenge"].as_str().unwrap().to_string();

        // Missing signature.
        let (status, body) = call(
            &t.router,
            "POST",
            "/api/v1/agents/verify-xpr",
            Some(api_key.as_str()),
            Some(json!({ "chain_account": "carolx" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "signature is required");

        // Wrong key.
        let stranger = SigningKey::from_bytes((&[99u8; 32]).into()).unwrap();
        let (status, _) = call(
            &t.router,
            "POST",
            "/api/v1/agents/verify-xpr",
            Some(api_key.as_str()),
            Some(json!({ "chain_account": "carolx", "signature": sign(&stranger, &challenge) })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        // Expired.
        t.clock.advance(300);
        let (status, _) = call(
            &t.router,
            "POST",
            "/api/v1/agents/verify-xpr",
            Some(api_key.as_str()),
            Some(json!({ "chain_account": "carolx", "signature": sign(&signer, &challenge) })),
        )
        .await;
        assert_eq!(status, StatusCode::GONE);
    }

    #[tokio::test]
    async fn transaction_gate_reports_block_number() {
        let t = app(VerificationConfig::default());
        let api_key = register(&t.router, "dave").await;
        let signer = key_on_chain(&t.ledger, "davex", 24);

        let (_, issued) = call(
            &t.router,
            "POST",
            "/api/v1/agents/verify-xpr/challenge",
            Some(api_key.as_str()),
            Some(json!({ "chain_account": "davex" })),
        )
        .await;
        let challenge = issued["challenge"].as_str().unwrap().to_string();
        let tx_id = "9a".repeat(32);
        t.ledger.add_transaction(ChainTransaction {
            id: tx_id.clone(),
            actions: vec![ActionTrace {
                block_num: 12_345_678,
                act: Action {
                    account: "eosio.token".into(),
                    name: "transfer".into(),
                    data: json!({"from": "davex", "to": "shellbook", "quantity": "0.0001 XPR", "memo": challenge}),
                },
            }],
        });

        let (status, _) = call(
            &t.router,
            "POST",
            "/api/v1/agents/verify-xpr",
            Some(api_key.as_str()),
            Some(json!({ "chain_account": "davex", "signature": sign(&signer, &challenge), "tx_id": "bad" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, linked) = call(
            &t.router,
            "POST",
            "/api/v1/agents/verify-xpr",
            Some(api_key.as_str()),
            Some(json!({ "chain_account": "davex", "signature": sign(&signer, &challenge), "tx_id": tx_id })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{linked}");
        assert_eq!(linked["block_num"], 12_345_678);
        assert_eq!(linked["tx_id"], tx_id);
        assert_eq!(linked["trust_boost"], 10);
    }
}
