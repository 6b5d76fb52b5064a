//! Fundamental types for Shellbook chain-identity verification.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! chain account names, identity ids and names, timestamps, and trust scores.

pub mod account;
pub mod error;
pub mod identity;
pub mod time;
pub mod trust;

pub use account::ChainAccount;
pub use error::TypeError;
pub use identity::{IdentityId, IdentityName};
pub use time::{Clock, SystemClock, Timestamp};
pub use trust::TrustScore;
