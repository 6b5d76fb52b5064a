//! secp256k1 public keys in the two textual encodings used by EOSIO-family chains.
//!
//! Legacy:  `EOS` + base58(key ++ ripemd160(key)[..4])
//! Typed:   `PUB_K1_` + base58(key ++ ripemd160(key ++ "K1")[..4])
//!
//! `key` is always the 33-byte SEC1 compressed point. A chain may report the same
//! key in either form, so comparisons go through [`PublicKey`] rather than strings.

use crate::hash::{decode_checked, encode_checked};
use crate::CryptoError;
use k256::ecdsa::VerifyingKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use std::fmt;
use std::str::FromStr;

/// Legacy key prefix.
pub const LEGACY_PREFIX: &str = "EOS";
/// Typed K1 key prefix.
pub const K1_PREFIX: &str = "PUB_K1_";

const K1_SUFFIX: &[u8] = b"K1";

/// A compressed secp256k1 public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; 33]);

impl PublicKey {
    /// Build from SEC1 compressed bytes, checking the point is on the curve.
    pub fn from_compressed(bytes: [u8; 33]) -> Result<Self, CryptoError> {
        VerifyingKey::from_sec1_bytes(&bytes)
            .map_err(|_| CryptoError::InvalidKey("not a point on secp256k1".into()))?;
        Ok(Self(bytes))
    }

    pub fn from_verifying_key(key: &VerifyingKey) -> Self {
        let point = key.to_encoded_point(true);
        let mut bytes = [0u8; 33];
        bytes.copy_from_slice(point.as_bytes());
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 33] {
        &self.0
    }

    /// Parse either the legacy or the typed K1 encoding.
    ///
    /// Other typed keys (`PUB_R1_`, `PUB_WA_`) return
    /// [`CryptoError::UnsupportedKeyType`].
    pub fn parse(text: &str) -> Result<Self, CryptoError> {
        let text = text.trim();
        let (payload, suffix) = if let Some(rest) = text.strip_prefix(K1_PREFIX) {
            (rest, K1_SUFFIX)
        } else if text.starts_with("PUB_") {
            return Err(CryptoError::UnsupportedKeyType(
                text.split('_').take(2).collect::<Vec<_>>().join("_"),
            ));
        } else if let Some(rest) = text.strip_prefix(LEGACY_PREFIX) {
            (rest, &[][..])
        } else {
            return Err(CryptoError::InvalidKey(format!("unrecognised key format: {text}")));
        };
        let bytes: [u8; 33] = decode_checked(payload, suffix)?;
        Self::from_compressed(bytes)
    }

    /// `EOS…` form.
    pub fn to_legacy_string(&self) -> String {
        format!("{LEGACY_PREFIX}{}", encode_checked(&self.0, &[]))
    }

    /// `PUB_K1_…` form.
    pub fn to_k1_string(&self) -> String {
        format!("{K1_PREFIX}{}", encode_checked(&self.0, K1_SUFFIX))
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_k1_string())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_k1_string())
    }
}

impl FromStr for PublicKey {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
