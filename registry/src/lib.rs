//! Agent registry lookups.
//!
//! The registry is an off-chain directory of known agents keyed by chain
//! account. It contributes a trust signal to verification but is never
//! authoritative: any failure is read as "not registered".

pub mod client;
pub mod error;
pub mod standing;
pub mod types;

pub use client::HttpRegistryClient;
pub use error::RegistryError;
pub use standing::{lookup_standing, NoRegistry, RegistryLookup};
pub use types::{RegistryAgent, RegistryStanding, TrustBreakdown};
