//! Verification orchestrator: drives one identity from `unlinked` to `linked`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use shellbook_crypto::NonceSource;
use shellbook_ledger::LedgerClient;
use shellbook_registry::{lookup_standing, RegistryLookup, RegistryStanding};
use shellbook_store::{ChainLink, ChallengeStore, IdentityStore, StoreError};
use shellbook_types::{ChainAccount, IdentityId, Timestamp, TrustScore};

use crate::challenge::{ChallengeIssuer, ChallengeLookup, DEFAULT_CHALLENGE_TTL_SECS};
use crate::error::VerificationError;
use crate::signature::SignatureVerifier;
use crate::state::LinkPhase;
use crate::transaction::{is_valid_tx_id, TransactionVerifier, DEFAULT_NATIVE_TOKEN_CONTRACT};
use crate::trust::compute_trust_boost;

/// Deployment knobs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VerificationConfig {
    /// Demand a memo-carrying transfer in addition to the signature.
    pub require_transaction_proof: bool,
    pub challenge_ttl_secs: u64,
    pub native_token_contract: String,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            require_transaction_proof: true,
            challenge_ttl_secs: DEFAULT_CHALLENGE_TTL_SECS,
            native_token_contract: DEFAULT_NATIVE_TOKEN_CONTRACT.to_string(),
        }
    }
}

/// A proof as submitted by the client. Fields are validated by
/// [`VerificationOrchestrator::submit_proof`].
#[derive(Clone, Debug, Default)]
pub struct ProofSubmission {
    pub chain_account: Option<String>,
    pub signature: Option<String>,
    pub tx_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssuedChallenge {
    pub challenge: String,
    pub chain_account: ChainAccount,
    pub expires_at: Timestamp,
    /// Seconds until `expires_at`.
    pub expires_in: u64,
}

/// Result of a successful link.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkOutcome {
    pub chain_account: ChainAccount,
    pub tx_id: Option<String>,
    pub block_num: Option<u64>,
    pub standing: RegistryStanding,
    pub trust_boost: u32,
    pub new_trust_score: TrustScore,
    /// Permission whose key produced the signature.
    pub permission: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkStatus {
    pub phase: LinkPhase,
    pub chain_account: Option<ChainAccount>,
    pub chain_verified: bool,
    pub trust_score: TrustScore,
    pub pending_challenge_expires_at: Option<Timestamp>,
}

pub struct VerificationOrchestrator {
    identities: Arc<dyn IdentityStore>,
    challenges: ChallengeIssuer,
    signatures: SignatureVerifier,
    transactions: TransactionVerifier,
    registry: Arc<dyn RegistryLookup>,
    config: VerificationConfig,
}

/// Validate a raw account name from a request body.
fn parse_account(raw: Option<&str>) -> Result<ChainAccount, VerificationError> {
    let raw = raw
        .filter(|s| !s.is_empty())
        .ok_or(VerificationError::MissingField("chain_account"))?;
    ChainAccount::parse(raw).map_err(|_| VerificationError::InvalidAccountName(raw.to_string()))
}

impl VerificationOrchestrator {
    pub fn new(
        identities: Arc<dyn IdentityStore>,
        challenges: Arc<dyn ChallengeStore>,
        nonces: Arc<dyn NonceSource>,
        ledger: Arc<dyn LedgerClient>,
        registry: Arc<dyn RegistryLookup>,
        config: VerificationConfig,
    ) -> Self {
        Self {
            identities,
            challenges: ChallengeIssuer::new(challenges, nonces, config.challenge_ttl_secs),
            signatures: SignatureVerifier::new(ledger.clone()),
            transactions: TransactionVerifier::new(ledger, config.native_token_contract.clone()),
            registry,
            config,
        }
    }

    pub fn config(&self) -> &VerificationConfig {
        &self.config
    }

    /// Fail with `AlreadyVerified` once `identity` has completed a link.
    fn ensure_not_verified(&self, identity: &IdentityId) -> Result<(), VerificationError> {
        match self.identities.get_identity(identity)?.verified_account() {
            Some(account) => Err(VerificationError::AlreadyVerified(account.clone())),
            None => Ok(()),
        }
    }

    /// Fail with `AlreadyLinked` if an identity other than `identity` holds `account`.
    fn ensure_unclaimed(
        &self,
        identity: &IdentityId,
        account: &ChainAccount,
    ) -> Result<(), VerificationError> {
        match self.identities.find_by_chain_account(account)? {
            Some(holder) if holder.id != *identity => Err(VerificationError::AlreadyLinked {
                account: account.clone(),
                holder: holder.name.to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// `unlinked → challenge_issued`.
    pub fn request_challenge(
        &self,
        identity: &IdentityId,
        chain_account: Option<&str>,
        now: Timestamp,
    ) -> Result<IssuedChallenge, VerificationError> {
        let account = parse_account(chain_account)?;
        self.ensure_not_verified(identity)?;
        self.ensure_unclaimed(identity, &account)?;

        let record = self.challenges.issue(*identity, account, now)?;
        info!(identity = %identity, account = %record.chain_account, "verification challenge issued");
        Ok(IssuedChallenge {
            expires_in: record.expires_at.secs_until(now),
            challenge: record.challenge,
            chain_account: record.chain_account,
            expires_at: record.expires_at,
        })
    }

    /// `challenge_issued → key_proven → (tx_proven) → linked`.
    ///
    /// Any rejection before the final write leaves the challenge in place so
    /// the client can retry; only expiry deletes it.
    pub async fn submit_proof(
        &self,
        identity: &IdentityId,
        proof: &ProofSubmission,
        now: Timestamp,
    ) -> Result<LinkOutcome, VerificationError> {
        let account = parse_account(proof.chain_account.as_deref())?;
        let signature = proof
            .signature
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(VerificationError::MissingField("signature"))?;
        let tx_id = proof.tx_id.as_deref().filter(|s| !s.is_empty());
        if tx_id.is_none() && self.config.require_transaction_proof {
            return Err(VerificationError::MissingField("tx_id"));
        }
        if let Some(tx_id) = tx_id {
            if !is_valid_tx_id(tx_id) {
                return Err(VerificationError::InvalidTxId(tx_id.to_string()));
            }
        }

        self.ensure_not_verified(identity)?;

        let challenge = match self.challenges.find(identity, &account, now)? {
            ChallengeLookup::Live(record) => record,
            ChallengeLookup::Expired => {
                info!(identity = %identity, account = %account, "expired challenge discarded");
                return Err(VerificationError::ChallengeExpired);
            }
            ChallengeLookup::Missing => {
                return Err(VerificationError::NoPendingChallenge(account));
            }
        };

        // key_proven
        let key_check = self
            .signatures
            .verify(&account, &challenge.challenge, signature)
            .await;
        if !key_check.valid {
            let reason = key_check.reason.unwrap_or_default();
            warn!(identity = %identity, account = %account, reason = %reason, "signature rejected");
            return Err(VerificationError::SignatureRejected(reason));
        }

        // tx_proven
        let mut block_num = None;
        if let Some(tx_id) = tx_id {
            let tx_check = self
                .transactions
                .verify(tx_id, &account, &challenge.challenge)
                .await;
            if !tx_check.valid {
                let reason = tx_check.reason.unwrap_or_default();
                warn!(identity = %identity, account = %account, tx_id, reason = %reason, "transaction rejected");
                return Err(VerificationError::TransactionRejected(reason));
            }
            block_num = tx_check.block_num;
        }

        // linked
        self.ensure_unclaimed(identity, &account)?;
        let standing = lookup_standing(self.registry.as_ref(), &account).await;
        let trust_boost = compute_trust_boost(&standing);
        let link = ChainLink {
            account: account.clone(),
            trust_boost,
            proof_tx_id: tx_id.map(str::to_string),
            proof_block_num: block_num,
            linked_at: now,
        };
        let updated = match self.identities.link_chain_account(identity, &link) {
            Ok(updated) => updated,
            Err(StoreError::LinkConflict { account, holder }) => {
                let holder = self
                    .identities
                    .get_identity(&holder)
                    .map(|h| h.name.to_string())
                    .unwrap_or_else(|_| holder.to_string());
                return Err(VerificationError::AlreadyLinked { account, holder });
            }
            Err(StoreError::AlreadyVerified { account, .. }) => {
                return Err(VerificationError::AlreadyVerified(account));
            }
            Err(e) => return Err(e.into()),
        };
        // The link is committed; a leftover challenge can no longer link again.
        if let Err(e) = self.challenges.consume(&challenge) {
            warn!(identity = %identity, error = %e, "failed to delete consumed challenge");
        }

        info!(
            identity = %identity,
            account = %account,
            trust_boost,
            trust_score = %updated.trust_score,
            "chain account linked"
        );
        Ok(LinkOutcome {
            chain_account: account,
            tx_id: link.proof_tx_id,
            block_num,
            standing,
            trust_boost,
            new_trust_score: updated.trust_score,
            permission: key_check.permission,
        })
    }

    /// Where the identity stands. A live (unexpired) challenge counts as issued.
    pub fn status(&self, identity: &IdentityId, now: Timestamp) -> Result<LinkStatus, VerificationError> {
        let record = self.identities.get_identity(identity)?;
        let pending = self
            .challenges
            .pending(identity)?
            .filter(|c| !c.is_expired(now));

        let phase = if record.chain_verified {
            LinkPhase::Linked
        } else if pending.is_some() {
            LinkPhase::ChallengeIssued
        } else {
            LinkPhase::Unlinked
        };
        Ok(LinkStatus {
            phase,
            chain_account: record.chain_account,
            chain_verified: record.chain_verified,
            trust_score: record.trust_score,
            pending_challenge_expires_at: pending.map(|c| c.expires_at),
        })
    }
}
