//! LMDB storage backend for Shellbook.
//!
//! Implements the storage traits from `shellbook-store` using the `heed` LMDB
//! bindings. Each logical store maps to one or more LMDB databases within a
//! single environment; values are `bincode`-encoded.

pub mod challenge;
pub mod environment;
pub mod error;
pub mod identity;

pub use challenge::LmdbChallengeStore;
pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use identity::LmdbIdentityStore;
