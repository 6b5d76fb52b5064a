//! SHA-256 digests and RIPEMD-160 checksums.

use crate::CryptoError;
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Compute the SHA-256 digest of arbitrary data.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Lowercase hex SHA-256 digest.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// First four bytes of `RIPEMD-160(data ++ suffix)`.
///
/// Legacy key strings use an empty suffix; typed strings (`PUB_K1_`,
/// `SIG_K1_`) append the key type, e.g. `b"K1"`.
pub(crate) fn ripemd160_checksum(data: &[u8], suffix: &[u8]) -> [u8; 4] {
    let mut hasher = Ripemd160::new();
    hasher.update(data);
    hasher.update(suffix);
    let digest = hasher.finalize();
    let mut out = [0u8; 4];
    out.copy_from_slice(&digest[..4]);
    out
}

/// Base58-decode `encoded` into `N` payload bytes followed by a 4-byte checksum,
/// verifying the checksum against `suffix`.
pub(crate) fn decode_checked<const N: usize>(
    encoded: &str,
    suffix: &[u8],
) -> Result<[u8; N], CryptoError> {
    let raw = bs58::decode(encoded)
        .into_vec()
        .map_err(|e| CryptoError::Encoding(e.to_string()))?;
    if raw.len() != N + 4 {
        return Err(CryptoError::Encoding(format!(
            "expected {} bytes, got {}",
            N + 4,
            raw.len()
        )));
    }
    let (payload, checksum) = raw.split_at(N);
    if ripemd160_checksum(payload, suffix) != checksum {
        return Err(CryptoError::ChecksumMismatch);
    }
    let mut out = [0u8; N];
    out.copy_from_slice(payload);
    Ok(out)
}

/// Base58-encode `payload ++ ripemd160_checksum(payload, suffix)`.
pub(crate) fn encode_checked(payload: &[u8], suffix: &[u8]) -> String {
    let mut raw = Vec::with_capacity(payload.len() + 4);
    raw.extend_from_slice(payload);
    raw.extend_from_slice(&ripemd160_checksum(payload, suffix));
    bs58::encode(raw).into_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn sha256_empty_is_not_zero() {
        assert_ne!(sha256(b""), [0u8; 32]);
    }

    #[test]
    fn checksum_depends_on_suffix() {
        let data = [7u8; 33];
        assert_ne!(ripemd160_checksum(&data, b""), ripemd160_checksum(&data, b"K1"));
    }

    #[test]
    fn checked_decode_detects_tampering() {
        let encoded = encode_checked(&[1, 2, 3, 4], b"K1");
        assert_eq!(decode_checked::<4>(&encoded, b"K1"), Ok([1, 2, 3, 4]));
        assert_eq!(
            decode_checked::<4>(&encoded, b""),
            Err(CryptoError::ChecksumMismatch)
        );
        assert!(matches!(
            decode_checked::<5>(&encoded, b"K1"),
            Err(CryptoError::Encoding(_))
        ));
        assert!(matches!(
            decode_checked::<4>("0OIl", b"K1"),
            Err(CryptoError::Encoding(_))
        ));
    }
}
