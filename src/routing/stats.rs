//! Introspection snapshots for CLI and admin endpoints.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::routing::cache::CacheStats;
use crate::routing::compiler::CompiledRoute;
use crate::routing::method::HttpMethod;

/// Per-method trie size.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct MethodStats {
    pub routes: usize,
    pub nodes: usize,
}

/// Point-in-time view of a router.
#[derive(Debug, Clone, Serialize)]
pub struct RouterStats {
    /// Registered routes, including ones shadowed by a later registration.
    pub routes: usize,
    /// Entries in the compile cache.
    pub compiled_routes: usize,
    /// Nodes in the combined trie. Grows monotonically until `rebuild`.
    pub combined_nodes: usize,
    /// Only methods with at least one route are listed.
    pub methods: BTreeMap<HttpMethod, MethodStats>,
    pub matches: u64,
    pub misses: u64,
    /// Lookups answered by the combined trie after the method trie missed.
    pub fallback_hits: u64,
    pub param_conflicts: usize,
    pub cache: CacheStats,
}

/// One row of a route listing.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RouteInfo {
    pub method: HttpMethod,
    pub path: String,
    pub name: Option<String>,
    pub priority: u64,
    pub params: Vec<String>,
    pub static_segments: usize,
    pub dynamic_segments: usize,
}

impl From<&CompiledRoute> for RouteInfo {
    fn from(compiled: &CompiledRoute) -> Self {
        Self {
            method: compiled.route.method,
            path: compiled.route.path.clone(),
            name: compiled.route.name.clone(),
            priority: compiled.priority,
            params: compiled.param_names.clone(),
            static_segments: compiled.static_count,
            dynamic_segments: compiled.dynamic_count,
        }
    }
}
