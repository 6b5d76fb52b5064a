//! Abstract storage traits for Shellbook.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The rest of the codebase depends only on the traits.

pub mod challenge;
pub mod error;
pub mod identity;

pub use challenge::{ChallengeId, ChallengeRecord, ChallengeStore};
pub use error::StoreError;
pub use identity::{ChainLink, Identity, IdentityStore};
