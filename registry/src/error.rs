use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("HTTP request to registry failed: {0}")]
    RequestFailed(String),

    #[error("invalid response from registry: {0}")]
    InvalidResponse(String),

    #[error("registry unreachable: {0}")]
    Unreachable(String),
}
