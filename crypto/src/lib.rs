//! Cryptographic primitives for Shellbook chain-identity proofs.
//!
//! - **secp256k1** (K1) public keys and recoverable signatures, as used by
//!   EOSIO-family ledgers such as XPR Network
//! - **SHA-256** for challenge digests and API-key hashing
//! - **RIPEMD-160** checksums for the base58 text encodings of keys and signatures
//! - Unpredictable nonces for verification challenges

pub mod apikey;
pub mod error;
pub mod hash;
pub mod keys;
pub mod nonce;
pub mod signature;

pub use apikey::{generate_api_key, hash_api_key};
pub use error::CryptoError;
pub use hash::{sha256, sha256_hex};
pub use keys::PublicKey;
pub use nonce::{NonceSource, OsNonceSource};
pub use signature::{sign_digest, Signature};
