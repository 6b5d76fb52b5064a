//! Nullable random: deterministic challenge nonces.

use shellbook_crypto::NonceSource;
use std::sync::atomic::{AtomicU64, Ordering};

/// Yields distinct, reproducible nonces: the seed in the first eight bytes,
/// a call counter in the next eight, zeros after.
pub struct NullRandom {
    seed: u64,
    counter: AtomicU64,
}

impl NullRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            counter: AtomicU64::new(0),
        }
    }
}

impl NonceSource for NullRandom {
    fn next_nonce(&self) -> [u8; 32] {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let mut nonce = [0u8; 32];
        nonce[..8].copy_from_slice(&self.seed.to_be_bytes());
        nonce[8..16].copy_from_slice(&n.to_be_bytes());
        nonce
    }
}
