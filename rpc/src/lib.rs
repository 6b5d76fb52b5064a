//! HTTP API for the Shellbook verification service.
//!
//! Provides endpoints for:
//! - Identity registration and lookup (bearer API keys)
//! - XPR chain-account verification: challenge, proof, status
//! - Prometheus metrics

pub mod auth;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod server;

pub use error::ApiError;
pub use metrics::ApiMetrics;
pub use server::{router, AppState, RpcServer};
