use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("unsupported key type: {0}")]
    UnsupportedKeyType(String),

    #[error("invalid public key: {0}")]
    InvalidKey(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("malformed base58 payload: {0}")]
    Encoding(String),

    #[error("checksum mismatch")]
    ChecksumMismatch,

    #[error("public key recovery failed")]
    RecoveryFailed,
}
