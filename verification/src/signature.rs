//! Key proof: does a signature over the challenge come from a key on the account?

use std::sync::Arc;

use tracing::{debug, warn};

use shellbook_crypto::{sha256, PublicKey, Signature};
use shellbook_ledger::LedgerClient;
use shellbook_types::ChainAccount;

pub const NO_MATCHING_KEY: &str = "Signature does not match any on-chain key for this account";

/// Outcome of a key proof. Never an error: every failure is a rejection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignatureCheck {
    pub valid: bool,
    pub reason: Option<String>,
    /// Permission whose key matched.
    pub permission: Option<String>,
}

impl SignatureCheck {
    fn accepted(permission: &str) -> Self {
        Self {
            valid: true,
            reason: None,
            permission: Some(permission.to_string()),
        }
    }

    fn rejected(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: Some(reason.into()),
            permission: None,
        }
    }
}

pub struct SignatureVerifier {
    ledger: Arc<dyn LedgerClient>,
}

impl SignatureVerifier {
    pub fn new(ledger: Arc<dyn LedgerClient>) -> Self {
        Self { ledger }
    }

    /// Recover the signer of SHA-256(`challenge`) and look for it among the
    /// keys of every permission on `account`. Non-K1 keys are skipped.
    pub async fn verify(
        &self,
        account: &ChainAccount,
        challenge: &str,
        signature: &str,
    ) -> SignatureCheck {
        let digest = sha256(challenge.as_bytes());
        let recovered = match Signature::parse(signature).and_then(|sig| sig.recover(&digest)) {
            Ok(key) => key,
            Err(e) => return SignatureCheck::rejected(format!("Invalid signature: {e}")),
        };

        let authority = match self.ledger.get_account(account).await {
            Ok(Some(authority)) => authority,
            Ok(None) => {
                return SignatureCheck::rejected(format!("XPR account @{account} not found on chain"))
            }
            Err(e) => {
                warn!(account = %account, error = %e, "account lookup failed");
                return SignatureCheck::rejected("Could not reach the XPR ledger to fetch account keys");
            }
        };

        for (permission, key_text) in authority.keys() {
            match PublicKey::parse(key_text) {
                Ok(key) if key == recovered => {
                    debug!(account = %account, permission, "signature matched on-chain key");
                    return SignatureCheck::accepted(permission);
                }
                Ok(_) => {}
                Err(e) => debug!(account = %account, key = key_text, error = %e, "skipping key"),
            }
        }
        SignatureCheck::rejected(NO_MATCHING_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::ecdsa::SigningKey;
    use shellbook_crypto::sign_digest;
    use shellbook_nullables::NullLedger;

    fn signing_key(seed: u8) -> SigningKey {
        SigningKey::from_bytes((&[seed; 32]).into()).unwrap()
    }

    fn public_key(key: &SigningKey) -> PublicKey {
        PublicKey::from_verifying_key(key.verifying_key())
    }

    fn sign(key: &SigningKey, challenge: &str) -> String {
        sign_digest(key, &sha256(challenge.as_bytes())).unwrap().to_string()
    }

    fn alicex() -> ChainAccount {
        ChainAccount::parse("alicex").unwrap()
    }

    const CHALLENGE: &str = "shellbook-verify:00112233445566778899aabbccddeeff00112233445566778899aabbccddeeff";

    #[tokio::test]
    async fn accepts_key_in_typed_encoding() {
        let key = signing_key(1);
        let ledger = NullLedger::new();
        ledger.add_account(&alicex(), &[("active", public_key(&key).to_k1_string())]);
        let verifier = SignatureVerifier::new(Arc::new(ledger));

        let check = verifier.verify(&alicex(), CHALLENGE, &sign(&key, CHALLENGE)).await;
        assert!(check.valid, "{check:?}");
        assert_eq!(check.permission.as_deref(), Some("active"));
    }

    #[tokio::test]
    async fn accepts_key_in_legacy_encoding_on_any_permission() {
        let key = signing_key(2);
        let other = signing_key(3);
        let ledger = NullLedger::new();
        ledger.add_account(
            &alicex(),
            &[
                ("active", "PUB_WA_notakey".to_string()),
                ("active", public_key(&other).to_k1_string()),
                ("owner", public_key(&key).to_legacy_string()),
            ],
        );
        let verifier = SignatureVerifier::new(Arc::new(ledger));

        let check = verifier.verify(&alicex(), CHALLENGE, &sign(&key, CHALLENGE)).await;
        assert!(check.valid, "{check:?}");
        assert_eq!(check.permission.as_deref(), Some("owner"));
    }

    #[tokio::test]
    async fn rejects_key_not_on_account() {
        let ledger = NullLedger::new();
        ledger.add_account(&alicex(), &[("active", public_key(&signing_key(4)).to_k1_string())]);
        let verifier = SignatureVerifier::new(Arc::new(ledger));

        let check = verifier
            .verify(&alicex(), CHALLENGE, &sign(&signing_key(5), CHALLENGE))
            .await;
        assert!(!check.valid);
        assert_eq!(check.reason.as_deref(), Some(NO_MATCHING_KEY));
    }

    #[tokio::test]
    async fn signature_over_other_text_does_not_match() {
        let key = signing_key(6);
        let ledger = NullLedger::new();
        ledger.add_account(&alicex(), &[("active", public_key(&key).to_k1_string())]);
        let verifier = SignatureVerifier::new(Arc::new(ledger));

        let check = verifier
            .verify(&alicex(), CHALLENGE, &sign(&key, "shellbook-verify:something-else"))
            .await;
        assert!(!check.valid);
    }

    #[tokio::test]
    async fn malformed_signature_is_rejected() {
        let verifier = SignatureVerifier::new(Arc::new(NullLedger::new()));
        let check = verifier.verify(&alicex(), CHALLENGE, "SIG_K1_garbage").await;
        assert!(!check.valid);
        assert!(check.reason.unwrap().starts_with("Invalid signature"));
    }

    #[tokio::test]
    async fn unknown_account_and_unreachable_ledger_are_rejected() {
        let key = signing_key(7);
        let sig = sign(&key, CHALLENGE);
        let ledger = Arc::new(NullLedger::new());
        let verifier = SignatureVerifier::new(ledger.clone());

        let check = verifier.verify(&alicex(), CHALLENGE, &sig).await;
        assert!(!check.valid);
        assert!(check.reason.unwrap().contains("not found"));

        ledger.add_account(&alicex(), &[("active", public_key(&key).to_k1_string())]);
        ledger.set_unreachable(true);
        let check = verifier.verify(&alicex(), CHALLENGE, &sig).await;
        assert!(!check.valid);
        assert!(check.reason.unwrap().contains("Could not reach"));
    }
}
