//! Route table and lookup entry point.
//!
//! # Responsibilities
//! - Own the compiler, the combined trie and the nine per-method tries
//! - Answer lookups through the match cache
//! - Invalidate the whole cache on every table mutation
//!
//! # Design Decisions
//! - Mutation takes `&mut self`; lookup takes `&self` and never blocks on I/O
//! - The method trie is authoritative; the combined trie is only consulted
//!   when it misses, and such hits are counted as a bug signal
//! - Removal clears terminal slots but keeps nodes; `rebuild` reclaims them

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::observability::metrics;
use crate::routing::cache::{cache_key, MatchCache};
use crate::routing::compiler::{cache_key as compile_key, split_path, CompiledRoute, RouteCompiler};
use crate::routing::error::RouteResult;
use crate::routing::matcher::{find_segments, RouteMatch};
use crate::routing::method::HttpMethod;
use crate::routing::route::Route;
use crate::routing::stats::{MethodStats, RouteInfo, RouterStats};
use crate::routing::trie::RouteTrie;

/// Default number of cached matches.
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

#[derive(Debug, Default)]
struct MatchCounters {
    matches: AtomicU64,
    misses: AtomicU64,
    fallback_hits: AtomicU64,
}

/// A compiled route table.
#[derive(Debug)]
pub struct Router {
    compiler: RouteCompiler,
    combined: RouteTrie,
    method_tries: [RouteTrie; HttpMethod::COUNT],
    /// Registration order, one entry per compile key.
    routes: Vec<Arc<CompiledRoute>>,
    cache: MatchCache,
    counters: MatchCounters,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    pub fn new() -> Self {
        Self::with_cache(MatchCache::new(DEFAULT_CACHE_CAPACITY))
    }

    pub fn with_cache(cache: MatchCache) -> Self {
        Self {
            compiler: RouteCompiler::new(),
            combined: RouteTrie::new(),
            method_tries: std::array::from_fn(|_| RouteTrie::new()),
            routes: Vec::new(),
            cache,
            counters: MatchCounters::default(),
        }
    }

    /// Compile and register `route`.
    ///
    /// Re-registering an identical (method, path, constraints) triple reuses
    /// the cached compilation and leaves the table unchanged.
    pub fn add_route(&mut self, route: Route) -> RouteResult<Arc<CompiledRoute>> {
        let seen = self.compiler.contains(&compile_key(&route));
        let compiled = self.compiler.compile(route)?;

        self.insert(&compiled);
        if !seen {
            self.routes.push(Arc::clone(&compiled));
        }
        self.cache.invalidate_all();

        tracing::debug!(
            method = %compiled.route.method,
            path = %compiled.route.path,
            priority = compiled.priority,
            duplicate = seen,
            "Route registered"
        );
        self.publish_size();
        Ok(compiled)
    }

    pub fn add_routes(&mut self, routes: impl IntoIterator<Item = Route>) -> RouteResult<()> {
        for route in routes {
            self.add_route(route)?;
        }
        Ok(())
    }

    fn insert(&mut self, compiled: &Arc<CompiledRoute>) {
        self.combined.insert(compiled);
        self.method_tries[compiled.route.method.index()].insert(compiled);
    }

    /// Unregister every variant of (method, path). Trie nodes are kept.
    pub fn remove_route(&mut self, method: HttpMethod, path: &str) -> bool {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.routes)
            .into_iter()
            .partition(|c| c.route.method == method && c.route.path == path);
        self.routes = kept;

        if removed.is_empty() {
            return false;
        }
        for compiled in &removed {
            self.combined.unregister(compiled);
            self.method_tries[method.index()].unregister(compiled);
            self.compiler.evict(compiled.key());
        }
        // Shadowed variants ending at a vacated slot take it back, latest first.
        for compiled in self.routes.iter().rev().filter(|c| c.route.method == method) {
            self.combined.fill_vacant(compiled);
            self.method_tries[method.index()].fill_vacant(compiled);
        }
        self.cache.invalidate_all();

        tracing::debug!(method = %method, path = %path, variants = removed.len(), "Route removed");
        self.publish_size();
        true
    }

    /// Recreate both tries from the live routes, releasing nodes left behind
    /// by removals.
    pub fn rebuild(&mut self) {
        let before = self.combined.node_count();
        self.combined.clear();
        for trie in &mut self.method_tries {
            trie.clear();
        }
        let routes = self.routes.clone();
        for compiled in &routes {
            self.insert(compiled);
        }
        self.cache.invalidate_all();

        tracing::info!(
            routes = routes.len(),
            nodes_before = before,
            nodes_after = self.combined.node_count(),
            "Route tries rebuilt"
        );
        self.publish_size();
    }

    /// Drop every route, both tries and both caches.
    pub fn clear(&mut self) {
        self.compiler.clear();
        self.combined.clear();
        for trie in &mut self.method_tries {
            trie.clear();
        }
        self.routes.clear();
        self.cache.clear();
        self.publish_size();
    }

    /// Drop cached matches only.
    pub fn invalidate_cache(&self) {
        self.cache.invalidate_all();
    }

    /// Resolve a request. Unknown methods resolve to no match.
    pub fn match_route(
        &self,
        path: &str,
        method: &str,
        domain: Option<&str>,
    ) -> Option<RouteMatch> {
        match method.parse::<HttpMethod>() {
            Ok(method) => self.lookup(path, method, domain),
            Err(e) => {
                tracing::trace!(error = %e, "Lookup with unsupported method");
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Resolve through the match cache.
    pub fn lookup(
        &self,
        path: &str,
        method: HttpMethod,
        domain: Option<&str>,
    ) -> Option<RouteMatch> {
        let cached = if self.cache.is_enabled() {
            let key = cache_key(method, path, domain);
            let hit = self.cache.get(&key);
            metrics::record_cache_lookup(hit.is_some());
            Some((key, hit))
        } else {
            None
        };

        let result = match cached {
            Some((_, Some(hit))) => Some(hit),
            Some((key, None)) => {
                let found = self.find(path, method);
                if let Some(m) = &found {
                    self.cache.set(key, m.clone());
                }
                found
            }
            None => self.find(path, method),
        };

        let outcome = if result.is_some() {
            self.counters.matches.fetch_add(1, Ordering::Relaxed);
            "matched"
        } else {
            self.counters.misses.fetch_add(1, Ordering::Relaxed);
            "not_found"
        };
        metrics::record_match(method.as_str(), outcome);
        result
    }

    /// Resolve without touching the cache.
    pub fn find(&self, path: &str, method: HttpMethod) -> Option<RouteMatch> {
        let segments: Vec<&str> = split_path(path).collect();
        if let Some(found) = find_segments(&self.method_tries[method.index()], &segments, method) {
            return Some(found);
        }

        let found = find_segments(&self.combined, &segments, method)?;
        self.counters.fallback_hits.fetch_add(1, Ordering::Relaxed);
        tracing::warn!(
            method = %method,
            path = %path,
            route = %found.route.path,
            "Combined trie matched where the method trie did not"
        );
        Some(found)
    }

    pub fn routes(&self) -> &[Arc<CompiledRoute>] {
        &self.routes
    }

    pub fn route_infos(&self) -> Vec<RouteInfo> {
        self.routes.iter().map(|c| RouteInfo::from(c.as_ref())).collect()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn cache(&self) -> &MatchCache {
        &self.cache
    }

    pub fn compiled_count(&self) -> usize {
        self.compiler.len()
    }

    pub fn stats(&self) -> RouterStats {
        let methods: BTreeMap<_, _> = HttpMethod::ALL
            .into_iter()
            .filter_map(|m| {
                let trie = &self.method_tries[m.index()];
                let routes = trie.route_count();
                (routes > 0).then(|| {
                    (
                        m,
                        MethodStats {
                            routes,
                            nodes: trie.node_count(),
                        },
                    )
                })
            })
            .collect();

        RouterStats {
            routes: self.routes.len(),
            compiled_routes: self.compiler.len(),
            combined_nodes: self.combined.node_count(),
            methods,
            matches: self.counters.matches.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            fallback_hits: self.counters.fallback_hits.load(Ordering::Relaxed),
            param_conflicts: self.combined.param_conflicts(),
            cache: self.cache.stats(),
        }
    }

    fn publish_size(&self) {
        metrics::record_table_size(self.routes.len(), self.combined.node_count());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::handler::{HandlerRef, HandlerResponse};

    fn handler(tag: &'static str) -> HandlerRef {
        HandlerRef::from_fn(move |_| HandlerResponse::text(200, tag))
    }

    fn get(path: &str) -> Route {
        Route::new(HttpMethod::Get, path, handler("get")).with_name(path)
    }

    #[test]
    fn test_duplicate_registration_is_idempotent() {
        let mut router = Router::new();
        let a = router.add_route(get("/users/{id}")).unwrap();
        let b = router.add_route(get("/users/{id}")).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(router.len(), 1);
        assert_eq!(router.compiled_count(), 1);
    }

    #[test]
    fn test_invalid_constraint_fails_registration() {
        let mut router = Router::new();
        let err = router
            .add_route(get("/users/{id}").with_constraint("id", "(["))
            .unwrap_err();
        assert!(err.to_string().contains("`id`"));
        assert!(router.is_empty());
        assert!(router.match_route("/users/1", "GET", None).is_none());
    }

    #[test]
    fn test_unknown_method_is_no_match() {
        let mut router = Router::new();
        router.add_route(get("/a")).unwrap();
        assert!(router.match_route("/a", "BREW", None).is_none());
        assert!(router.match_route("/a", "get", None).is_some());
    }

    #[test]
    fn test_cache_is_read_through() {
        let mut router = Router::new();
        router.add_route(get("/a/{x}")).unwrap();

        let first = router.match_route("/a/1", "GET", None).unwrap();
        let second = router.match_route("/a/1", "GET", None).unwrap();
        assert_eq!(first.params, second.params);

        let stats = router.cache().stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn test_mutation_invalidates_cache() {
        let mut router = Router::new();
        router.add_route(get("/a/{x}")).unwrap();
        router.match_route("/a/special", "GET", None).unwrap();
        assert_eq!(router.cache().len(), 1);

        router.add_route(get("/a/special")).unwrap();
        assert!(router.cache().is_empty());
        let m = router.match_route("/a/special", "GET", None).unwrap();
        assert_eq!(m.route.path, "/a/special");
    }

    #[test]
    fn test_domains_cache_independently() {
        let mut router = Router::new();
        router.add_route(get("/x")).unwrap();
        router.match_route("/x", "GET", Some("a.example")).unwrap();
        router.match_route("/x", "GET", Some("b.example")).unwrap();
        assert_eq!(router.cache().len(), 2);
    }

    #[test]
    fn test_remove_route_keeps_nodes_until_rebuild() {
        let mut router = Router::new();
        router.add_route(get("/a")).unwrap();
        router.add_route(get("/deep/path/here")).unwrap();
        let nodes = router.stats().combined_nodes;

        assert!(router.remove_route(HttpMethod::Get, "/deep/path/here"));
        assert!(!router.remove_route(HttpMethod::Get, "/deep/path/here"));
        assert!(router.match_route("/deep/path/here", "GET", None).is_none());
        assert_eq!(router.stats().combined_nodes, nodes);
        assert_eq!(router.compiled_count(), 1);

        router.rebuild();
        assert_eq!(router.stats().combined_nodes, 2);
        assert!(router.match_route("/a", "GET", None).is_some());
    }

    #[test]
    fn test_remove_restores_shadowed_variant() {
        let mut router = Router::new();
        router
            .add_route(Route::new(HttpMethod::Get, r"/users/{id:\d+}", handler("numeric")))
            .unwrap();
        router
            .add_route(Route::new(HttpMethod::Get, "/users/{id}", handler("any")))
            .unwrap();
        assert_eq!(router.len(), 2);

        assert!(router.remove_route(HttpMethod::Get, "/users/{id}"));
        assert_eq!(router.len(), 1);

        let before = router
            .match_route("/users/7", "GET", None)
            .map(|m| m.route.path.clone());
        assert_eq!(before.as_deref(), Some(r"/users/{id:\d+}"));

        router.rebuild();
        let after = router
            .match_route("/users/7", "GET", None)
            .map(|m| m.route.path.clone());
        assert_eq!(before, after);
        assert_eq!(router.stats().fallback_hits, 0);
    }

    #[test]
    fn test_remove_keeps_other_slots() {
        let mut router = Router::new();
        router.add_route(get("/a/{x}")).unwrap();
        router.add_route(get("/b")).unwrap();
        assert!(router.remove_route(HttpMethod::Get, "/b"));
        assert!(router.match_route("/b", "GET", None).is_none());
        assert!(router.match_route("/a/1", "GET", None).is_some());
    }

    #[test]
    fn test_clear_drops_everything() {
        let mut router = Router::new();
        router.add_route(get("/health")).unwrap();
        router.match_route("/health", "GET", None).unwrap();
        router.clear();

        assert!(router.match_route("/health", "GET", None).is_none());
        let stats = router.stats();
        assert_eq!(stats.routes, 0);
        assert_eq!(stats.compiled_routes, 0);
        assert_eq!(stats.combined_nodes, 1);
        assert!(stats.methods.is_empty());
    }

    #[test]
    fn test_stats_per_method() {
        let mut router = Router::new();
        router.add_route(get("/a/b")).unwrap();
        router
            .add_route(Route::new(HttpMethod::Post, "/a/c", handler("post")))
            .unwrap();

        let stats = router.stats();
        assert_eq!(stats.routes, 2);
        // root, a, b, c
        assert_eq!(stats.combined_nodes, 4);
        assert_eq!(stats.methods[&HttpMethod::Get], MethodStats { routes: 1, nodes: 3 });
        assert_eq!(stats.methods[&HttpMethod::Post], MethodStats { routes: 1, nodes: 3 });
        assert!(!stats.methods.contains_key(&HttpMethod::Put));
    }

    #[test]
    fn test_disabled_cache_still_matches() {
        let mut router = Router::with_cache(MatchCache::disabled());
        router.add_route(get("/x/{id}")).unwrap();
        let m = router.match_route("/x/9", "GET", None).unwrap();
        assert_eq!(m.params["id"], "9");
        assert_eq!(router.cache().len(), 0);
    }

    #[test]
    fn test_handler_is_returned_untouched() {
        let mut router = Router::new();
        let h = handler("mine");
        router
            .add_route(Route::new(HttpMethod::Get, "/h", h.clone()))
            .unwrap();
        let m = router.match_route("/h", "GET", None).unwrap();
        assert!(m.route.handler.ptr_eq(&h));
    }
}
