//! Chain-identity verification.
//!
//! An identity proves control of an XPR account in up to three gated steps:
//!
//! 1. **Challenge**: a single-use random string bound to the identity and the
//!    target account, valid for five minutes.
//! 2. **Key proof**: a `SIG_K1_` signature over SHA-256 of the challenge that
//!    recovers to a key listed on any permission of the account.
//! 3. **Transaction proof** (optional per deployment): a native token
//!    transfer from the account whose memo carries the challenge.
//!
//! A successful proof links the account to the identity with a conditional
//! write and raises the identity's trust score by a registry-derived boost.

pub mod challenge;
pub mod error;
pub mod orchestrator;
pub mod signature;
pub mod state;
pub mod transaction;
pub mod trust;

pub use challenge::{ChallengeIssuer, ChallengeLookup, CHALLENGE_PREFIX, DEFAULT_CHALLENGE_TTL_SECS};
pub use error::{ErrorKind, VerificationError};
pub use orchestrator::{
    IssuedChallenge, LinkOutcome, LinkStatus, ProofSubmission, VerificationConfig,
    VerificationOrchestrator,
};
pub use signature::{SignatureCheck, SignatureVerifier};
pub use state::LinkPhase;
pub use transaction::{
    is_valid_tx_id, TransactionCheck, TransactionVerifier, DEFAULT_NATIVE_TOKEN_CONTRACT,
};
pub use trust::compute_trust_boost;
