//! Single-use proof-of-control challenges.

use std::sync::Arc;

use tracing::debug;

use shellbook_crypto::NonceSource;
use shellbook_store::{ChallengeId, ChallengeRecord, ChallengeStore, StoreError};
use shellbook_types::{ChainAccount, IdentityId, Timestamp};

pub const CHALLENGE_PREFIX: &str = "shellbook-verify:";
pub const DEFAULT_CHALLENGE_TTL_SECS: u64 = 300;

/// Outcome of looking up the challenge a proof answers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChallengeLookup {
    Live(ChallengeRecord),
    /// The challenge for this account had expired and has been deleted.
    Expired,
    Missing,
}

/// Issues, finds and consumes challenges on top of a [`ChallengeStore`].
///
/// Expired rows are reclaimed lazily by [`ChallengeIssuer::find`].
pub struct ChallengeIssuer {
    store: Arc<dyn ChallengeStore>,
    nonces: Arc<dyn NonceSource>,
    ttl_secs: u64,
}

impl ChallengeIssuer {
    pub fn new(store: Arc<dyn ChallengeStore>, nonces: Arc<dyn NonceSource>, ttl_secs: u64) -> Self {
        Self {
            store,
            nonces,
            ttl_secs,
        }
    }

    /// Create or replace the identity's pending challenge.
    pub fn issue(
        &self,
        identity: IdentityId,
        account: ChainAccount,
        now: Timestamp,
    ) -> Result<ChallengeRecord, StoreError> {
        let record = ChallengeRecord {
            id: ChallengeId::generate(),
            identity,
            chain_account: account,
            challenge: format!("{CHALLENGE_PREFIX}{}", hex::encode(self.nonces.next_nonce())),
            created_at: now,
            expires_at: now.plus_secs(self.ttl_secs),
        };
        self.store.put_challenge(&record)?;
        debug!(identity = %identity, account = %record.chain_account, "challenge stored");
        Ok(record)
    }

    /// The identity's live challenge for `account`.
    ///
    /// An expired row is deleted whichever account it targets.
    pub fn find(
        &self,
        identity: &IdentityId,
        account: &ChainAccount,
        now: Timestamp,
    ) -> Result<ChallengeLookup, StoreError> {
        let Some(record) = self.store.get_challenge(identity)? else {
            return Ok(ChallengeLookup::Missing);
        };
        let same_account = record.chain_account == *account;
        if record.is_expired(now) {
            self.consume(&record)?;
            debug!(identity = %identity, account = %record.chain_account, "expired challenge deleted");
            return Ok(if same_account {
                ChallengeLookup::Expired
            } else {
                ChallengeLookup::Missing
            });
        }
        Ok(if same_account {
            ChallengeLookup::Live(record)
        } else {
            ChallengeLookup::Missing
        })
    }

    /// The identity's pending challenge for any account.
    pub fn pending(&self, identity: &IdentityId) -> Result<Option<ChallengeRecord>, StoreError> {
        self.store.get_challenge(identity)
    }

    /// Delete `record` unless a newer challenge has replaced it.
    pub fn consume(&self, record: &ChallengeRecord) -> Result<bool, StoreError> {
        self.store.delete_challenge(&record.identity, &record.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shellbook_crypto::OsNonceSource;
    use shellbook_nullables::{NullRandom, NullStore};
    use std::collections::HashSet;

    fn account(name: &str) -> ChainAccount {
        ChainAccount::parse(name).unwrap()
    }

    fn issuer(store: Arc<NullStore>) -> ChallengeIssuer {
        ChallengeIssuer::new(store, Arc::new(NullRandom::new(7)), DEFAULT_CHALLENGE_TTL_SECS)
    }

    #[test]
    fn challenge_has_prefix_and_hex_nonce() {
        let issuer = issuer(Arc::new(NullStore::new()));
        let record = issuer
            .issue(IdentityId::generate(), account("alicex"), Timestamp::new(1_000))
            .unwrap();
        let nonce = record.challenge.strip_prefix(CHALLENGE_PREFIX).unwrap();
        assert_eq!(nonce.len(), 64);
        assert!(nonce.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(record.expires_at, Timestamp::new(1_300));
    }

    #[test]
    fn second_issue_replaces_the_first() {
        let store = Arc::new(NullStore::new());
        let issuer = issuer(store.clone());
        let id = IdentityId::generate();
        let first = issuer.issue(id, account("alicex"), Timestamp::new(1_000)).unwrap();
        let second = issuer.issue(id, account("alicex"), Timestamp::new(1_010)).unwrap();

        assert_ne!(first.challenge, second.challenge);
        assert_eq!(
            issuer.find(&id, &account("alicex"), Timestamp::new(1_020)).unwrap(),
            ChallengeLookup::Live(second.clone())
        );
        assert!(!issuer.consume(&first).unwrap());
        assert!(issuer.consume(&second).unwrap());
        assert_eq!(
            issuer.find(&id, &account("alicex"), Timestamp::new(1_020)).unwrap(),
            ChallengeLookup::Missing
        );
    }

    #[test]
    fn find_ignores_challenge_for_other_account() {
        let issuer = issuer(Arc::new(NullStore::new()));
        let id = IdentityId::generate();
        issuer.issue(id, account("alicex"), Timestamp::new(1_000)).unwrap();
        assert_eq!(
            issuer.find(&id, &account("bobx"), Timestamp::new(1_010)).unwrap(),
            ChallengeLookup::Missing
        );
        assert!(issuer.pending(&id).unwrap().is_some());
    }

    #[test]
    fn expired_challenge_is_deleted_on_lookup() {
        let issuer = issuer(Arc::new(NullStore::new()));
        let id = IdentityId::generate();
        issuer.issue(id, account("alicex"), Timestamp::new(1_000)).unwrap();
        assert_eq!(
            issuer.find(&id, &account("alicex"), Timestamp::new(1_300)).unwrap(),
            ChallengeLookup::Expired
        );
        assert!(issuer.pending(&id).unwrap().is_none());
    }

    #[test]
    fn expired_challenge_for_other_account_is_deleted_too() {
        let issuer = issuer(Arc::new(NullStore::new()));
        let id = IdentityId::generate();
        issuer.issue(id, account("alicex"), Timestamp::new(1_000)).unwrap();
        assert_eq!(
            issuer.find(&id, &account("bobx"), Timestamp::new(2_000)).unwrap(),
            ChallengeLookup::Missing
        );
        assert!(issuer.pending(&id).unwrap().is_none());
    }

    #[test]
    fn os_backed_challenges_do_not_repeat() {
        let issuer = ChallengeIssuer::new(
            Arc::new(NullStore::new()),
            Arc::new(OsNonceSource),
            DEFAULT_CHALLENGE_TTL_SECS,
        );
        let seen: HashSet<String> = (0..100)
            .map(|_| {
                issuer
                    .issue(IdentityId::generate(), account("alicex"), Timestamp::new(0))
                    .unwrap()
                    .challenge
            })
            .collect();
        assert_eq!(seen.len(), 100);
    }
}
