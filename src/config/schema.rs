//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::routing::router::DEFAULT_CACHE_CAPACITY;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Match cache settings.
    pub cache: CacheConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Route table, registered in order.
    pub routes: Vec<RouteConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Match cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Enable the match cache.
    pub enabled: bool,

    /// Maximum cached matches before LRU eviction.
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level or filter directives (e.g. "info", "trie_router=debug").
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// One route definition.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// HTTP method (case-insensitive).
    pub method: String,

    /// Path pattern, e.g. "/users/{id:\\d+}".
    pub path: String,

    /// Handler identifier reported in responses and logs.
    pub handler: String,

    /// Optional route name for listings.
    #[serde(default)]
    pub name: Option<String>,

    /// Per-parameter regex constraints.
    #[serde(default)]
    pub constraints: BTreeMap<String, String>,

    /// Response status (default: 200).
    #[serde(default = "default_status")]
    pub status: u16,

    /// Fixed response body. When absent the handler echoes its match as JSON.
    #[serde(default)]
    pub body: Option<String>,
}

fn default_status() -> u16 {
    200
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: RouterConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert!(config.cache.enabled);
        assert_eq!(config.cache.capacity, DEFAULT_CACHE_CAPACITY);
        assert!(config.routes.is_empty());
    }

    #[test]
    fn test_route_table_parses() {
        let config: RouterConfig = toml::from_str(
            r#"
            [cache]
            capacity = 16

            [[routes]]
            method = "GET"
            path = "/users/{id}"
            handler = "users.show"
            constraints = { id = '\d+' }

            [[routes]]
            method = "post"
            path = "/users"
            handler = "users.create"
            status = 201
            body = "created"
            "#,
        )
        .unwrap();

        assert_eq!(config.cache.capacity, 16);
        assert_eq!(config.routes.len(), 2);
        assert_eq!(config.routes[0].constraints["id"], r"\d+");
        assert_eq!(config.routes[0].status, 200);
        assert_eq!(config.routes[1].status, 201);
        assert_eq!(config.routes[1].body.as_deref(), Some("created"));
    }
}
