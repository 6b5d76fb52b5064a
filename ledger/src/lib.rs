//! Read-only access to the XPR ledger.
//!
//! Two lookups are needed to prove control of a chain account: the account's
//! permission tree (chain RPC `get_account`) and a historical transaction by
//! id (Hyperion `get_transaction`). Both sit behind [`LedgerClient`] so the
//! verification core can be exercised without a network.

pub mod client;
pub mod error;
pub mod http;
pub mod types;

pub use client::LedgerClient;
pub use error::LedgerError;
pub use http::HttpLedgerClient;
pub use types::{
    AccountAuthority, Action, ActionTrace, Authority, ChainTransaction, KeyWeight, Permission,
    TransferData,
};
