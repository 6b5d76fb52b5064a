//! Nullable infrastructure for deterministic testing.
//!
//! Every external dependency of the verification service (clock, nonce
//! source, storage, chain ledger, agent registry) sits behind a trait. This
//! crate provides test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod ledger;
pub mod random;
pub mod registry;
pub mod store;

pub use clock::NullClock;
pub use ledger::NullLedger;
pub use random::NullRandom;
pub use registry::NullRegistry;
pub use store::NullStore;
