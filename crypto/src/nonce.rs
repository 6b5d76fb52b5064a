//! Nonce sources for verification challenges.

use rand::rngs::OsRng;
use rand::RngCore;

/// Source of 32-byte challenge nonces.
///
/// Production uses [`OsNonceSource`]; tests swap in a deterministic source.
pub trait NonceSource: Send + Sync {
    fn next_nonce(&self) -> [u8; 32];
}

/// Nonces drawn from the operating system CSPRNG (256 bits of entropy each).
#[derive(Clone, Copy, Debug, Default)]
pub struct OsNonceSource;

impl NonceSource for OsNonceSource {
    fn next_nonce(&self) -> [u8; 32] {
        let mut nonce = [0u8; 32];
        OsRng.fill_bytes(&mut nonce);
        nonce
    }
}
