//! Metrics collection and exposition.
//!
//! # Metrics
//! - `router_matches_total` (counter): lookups by method, outcome
//! - `router_cache_lookups_total` (counter): match cache lookups by result
//! - `router_routes` (gauge): registered routes
//! - `router_trie_nodes` (gauge): nodes in the combined trie

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter listening on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_match(method: &'static str, outcome: &'static str) {
    ::metrics::counter!("router_matches_total", "method" => method, "outcome" => outcome)
        .increment(1);
}

pub fn record_cache_lookup(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    ::metrics::counter!("router_cache_lookups_total", "result" => result).increment(1);
}

pub fn record_table_size(routes: usize, nodes: usize) {
    ::metrics::gauge!("router_routes").set(routes as f64);
    ::metrics::gauge!("router_trie_nodes").set(nodes as f64);
}
