//! Prometheus metrics for the verification API.
//!
//! [`ApiMetrics`] owns a dedicated [`Registry`] that the `/metrics` endpoint
//! encodes into the Prometheus text exposition format.

use prometheus::{
    register_histogram_with_registry, register_int_counter_vec_with_registry,
    register_int_counter_with_registry, Encoder, Histogram, HistogramOpts, IntCounter,
    IntCounterVec, Opts, Registry, TextEncoder,
};

pub struct ApiMetrics {
    pub registry: Registry,

    pub identities_registered: IntCounter,
    pub challenges_issued: IntCounter,
    pub proofs_accepted: IntCounter,
    /// Labelled by error kind (`validation`, `expired`, `proof_rejected`, ...).
    pub proofs_rejected: IntCounterVec,

    /// Wall time of a proof submission, including ledger and registry calls.
    pub proof_latency_seconds: Histogram,
}

impl ApiMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let identities_registered = register_int_counter_with_registry!(
            Opts::new(
                "shellbook_identities_registered_total",
                "Total identities registered"
            ),
            registry
        )
        .expect("failed to register identities_registered counter");

        let challenges_issued = register_int_counter_with_registry!(
            Opts::new(
                "shellbook_challenges_issued_total",
                "Total verification challenges issued"
            ),
            registry
        )
        .expect("failed to register challenges_issued counter");

        let proofs_accepted = register_int_counter_with_registry!(
            Opts::new(
                "shellbook_proofs_accepted_total",
                "Total proofs that linked a chain account"
            ),
            registry
        )
        .expect("failed to register proofs_accepted counter");

        let proofs_rejected = register_int_counter_vec_with_registry!(
            Opts::new(
                "shellbook_proofs_rejected_total",
                "Total proofs rejected, by error kind"
            ),
            &["kind"],
            registry
        )
        .expect("failed to register proofs_rejected counter");

        let proof_latency_seconds = register_histogram_with_registry!(
            HistogramOpts::new(
                "shellbook_proof_latency_seconds",
                "Proof submission latency in seconds"
            )
            .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0]),
            registry
        )
        .expect("failed to register proof_latency_seconds histogram");

        Self {
            registry,
            identities_registered,
            challenges_issued,
            proofs_accepted,
            proofs_rejected,
            proof_latency_seconds,
        }
    }

    /// Encode every metric in the text exposition format.
    pub fn encode(&self) -> String {
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        if encoder.encode(&self.registry.gather(), &mut buffer).is_err() {
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

impl Default for ApiMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_output_names_every_family() {
        let metrics = ApiMetrics::new();
        metrics.challenges_issued.inc();
        metrics.proofs_rejected.with_label_values(&["expired"]).inc();
        metrics.proof_latency_seconds.observe(0.2);

        let text = metrics.encode();
        assert!(text.contains("shellbook_challenges_issued_total 1"));
        assert!(text.contains("shellbook_proofs_rejected_total{kind=\"expired\"} 1"));
        assert!(text.contains("shellbook_proof_latency_seconds_count 1"));
    }
}
