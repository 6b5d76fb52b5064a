//! Recoverable secp256k1 signatures in `SIG_K1_` text form.
//!
//! Layout of the 65 signed bytes: `[header | r (32) | s (32)]`, where
//! `header = 27 + 4 + recovery_id` for signatures over compressed keys. The text
//! form is `SIG_K1_` + base58(bytes ++ ripemd160(bytes ++ "K1")[..4]).

use crate::hash::{decode_checked, encode_checked};
use crate::{CryptoError, PublicKey};
use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, SigningKey, VerifyingKey};
use std::fmt;
use std::str::FromStr;

pub const SIG_K1_PREFIX: &str = "SIG_K1_";

const K1_SUFFIX: &[u8] = b"K1";
const HEADER_BASE: u8 = 27;
const COMPRESSED_FLAG: u8 = 4;

/// A recoverable K1 signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature([u8; 65]);

impl Signature {
    /// Assemble from an ECDSA signature and its recovery id.
    pub fn from_parts(signature: &EcdsaSignature, recovery_id: RecoveryId) -> Self {
        let mut bytes = [0u8; 65];
        bytes[0] = HEADER_BASE + COMPRESSED_FLAG + recovery_id.to_byte();
        bytes[1..].copy_from_slice(&signature.to_bytes());
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 65] {
        &self.0
    }

    pub fn parse(text: &str) -> Result<Self, CryptoError> {
        let text = text.trim();
        let payload = match text.strip_prefix(SIG_K1_PREFIX) {
            Some(rest) => rest,
            None if text.starts_with("SIG_") => {
                return Err(CryptoError::UnsupportedKeyType(
                    text.split('_').take(2).collect::<Vec<_>>().join("_"),
                ))
            }
            None => {
                return Err(CryptoError::InvalidSignature(
                    "expected a SIG_K1_ signature".into(),
                ))
            }
        };
        let bytes: [u8; 65] = decode_checked(payload, K1_SUFFIX)?;
        let sig = Self(bytes);
        sig.recovery_id()?;
        Ok(sig)
    }

    fn recovery_id(&self) -> Result<RecoveryId, CryptoError> {
        let header = self.0[0];
        if !(HEADER_BASE..HEADER_BASE + 8).contains(&header) {
            return Err(CryptoError::InvalidSignature(format!(
                "bad header byte {header}"
            )));
        }
        RecoveryId::from_byte((header - HEADER_BASE) & 3).ok_or_else(|| {
            CryptoError::InvalidSignature(format!("bad recovery id in header {header}"))
        })
    }

    /// Recover the public key that produced this signature over `digest`.
    ///
    /// High-S signatures are normalised first (flipping the recovery parity),
    /// so both canonical and non-canonical encodings recover the same key.
    pub fn recover(&self, digest: &[u8; 32]) -> Result<PublicKey, CryptoError> {
        let mut recovery_id = self.recovery_id()?;
        let mut signature = EcdsaSignature::from_slice(&self.0[1..])
            .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
        if let Some(normalized) = signature.normalize_s() {
            signature = normalized;
            recovery_id = RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced());
        }
        let key = VerifyingKey::recover_from_prehash(digest, &signature, recovery_id)
            .map_err(|_| CryptoError::RecoveryFailed)?;
        Ok(PublicKey::from_verifying_key(&key))
    }
}

/// Sign a 32-byte digest, producing a recoverable K1 signature.
pub fn sign_digest(key: &SigningKey, digest: &[u8; 32]) -> Result<Signature, CryptoError> {
    let (signature, recovery_id) = key
        .sign_prehash_recoverable(digest)
        .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
    Ok(Signature::from_parts(&signature, recovery_id))
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SIG_K1_PREFIX}{}", encode_checked(&self.0, K1_SUFFIX))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({self})")
    }
}

impl FromStr for Signature {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
