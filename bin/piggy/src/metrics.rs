//! Prometheus metrics for the vault client.
//!
//! All metrics are aggregated in the [`Metrics`] struct for easy tracking and management.

use metrics::{counter, describe_counter, describe_gauge, gauge};

/// Aggregated metrics for the vault client.
///
/// Metrics are registered with the global metrics registry on creation.
/// Without an installed exporter every call is a no-op.
#[derive(Debug, Clone)]
pub struct Metrics {
    _private: (),
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Create a new metrics instance and register all metric descriptions.
    pub fn new() -> Self {
        Self::register_descriptions();
        Self { _private: () }
    }

    /// Register metric descriptions with the global registry.
    fn register_descriptions() {
        // Reconciliation metrics
        describe_counter!(
            "piggy_reconciliations_total",
            "Total number of successful deposit list reconciliations"
        );
        describe_counter!(
            "piggy_reconciliation_failures_total",
            "Total number of failed deposit list reconciliations"
        );

        // Deposit list gauges
        describe_gauge!(
            "piggy_deposits",
            "Number of deposits in the current snapshot"
        );
        describe_gauge!(
            "piggy_matured_deposits",
            "Number of deposits ready to be withdrawn"
        );

        // Action metrics
        describe_counter!(
            "piggy_action_success_total",
            "Total confirmed actions by action name"
        );
        describe_counter!(
            "piggy_action_failure_total",
            "Total failed actions by action name"
        );
        describe_counter!(
            "piggy_action_rejected_total",
            "Total actions rejected before reaching the ledger, by reason"
        );

        // Network metrics
        describe_gauge!(
            "piggy_wallet_chain_id",
            "Chain id the wallet is currently connected to"
        );
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Reconciliation metrics
    // ─────────────────────────────────────────────────────────────────────────────

    /// Record a completed reconciliation.
    pub fn record_reconciliation(&self, deposits: usize, matured: usize) {
        counter!("piggy_reconciliations_total").increment(1);
        gauge!("piggy_deposits").set(deposits as f64);
        gauge!("piggy_matured_deposits").set(matured as f64);
    }

    /// Record a failed reconciliation.
    pub fn record_reconciliation_failure(&self) {
        counter!("piggy_reconciliation_failures_total").increment(1);
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Action metrics
    // ─────────────────────────────────────────────────────────────────────────────

    /// Record a confirmed action.
    pub fn record_action_success(&self, action: &str) {
        counter!("piggy_action_success_total", "action" => action.to_string()).increment(1);
    }

    /// Record a failed action.
    pub fn record_action_failure(&self, action: &str) {
        counter!("piggy_action_failure_total", "action" => action.to_string()).increment(1);
    }

    /// Record an action rejected locally.
    pub fn record_action_rejected(&self, reason: &str) {
        counter!("piggy_action_rejected_total", "reason" => reason.to_string()).increment(1);
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Network metrics
    // ─────────────────────────────────────────────────────────────────────────────

    /// Set the chain id reported by the wallet.
    pub fn set_chain_id(&self, chain_id: u64) {
        gauge!("piggy_wallet_chain_id").set(chain_id as f64);
    }
}

/// Install the Prometheus metrics exporter and start the HTTP server.
///
/// Returns an error if the server fails to bind to the specified port.
pub fn install_prometheus_exporter(port: u16) -> eyre::Result<()> {
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::net::SocketAddr;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| eyre::eyre!("Failed to install Prometheus exporter: {}", e))?;

    Ok(())
}
