//! Route compilation.
//!
//! # Responsibilities
//! - Parse a route pattern into typed segments
//! - Score routes by specificity
//! - Cache compiled routes under a deterministic key
//!
//! # Scoring
//! Each segment contributes `(total - index) * class`, where class is
//! 1000 for static, 100 for constrained parameters, 10 for plain parameters
//! and 1 for wildcards. Earlier segments weigh more.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

use crate::routing::error::RouteResult;
use crate::routing::route::Route;
use crate::routing::segment::RouteSegment;

const STATIC_WEIGHT: u64 = 1000;
const CONSTRAINED_WEIGHT: u64 = 100;
const PARAM_WEIGHT: u64 = 10;
const WILDCARD_WEIGHT: u64 = 1;

/// A parsed, scored route. Shared between the compile cache and both tries.
#[derive(Debug)]
pub struct CompiledRoute {
    pub route: Arc<Route>,
    pub segments: Vec<RouteSegment>,
    pub param_names: Vec<String>,
    pub priority: u64,
    pub static_count: usize,
    pub dynamic_count: usize,
    key: String,
}

impl CompiledRoute {
    /// The compile cache key this route is stored under.
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// `METHOD:path` followed by `#name=pattern` for each constraint in key order.
pub fn cache_key(route: &Route) -> String {
    let mut key = format!("{}:{}", route.method, route.path);
    for (name, pattern) in &route.constraints {
        let _ = write!(key, "#{name}={pattern}");
    }
    key
}

/// Split a pattern or concrete path on `/`, discarding empty tokens.
pub fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Specificity score. Saturates instead of wrapping for very deep patterns.
pub fn priority(segments: &[RouteSegment]) -> u64 {
    let total = segments.len() as u64;
    segments
        .iter()
        .enumerate()
        .map(|(index, seg)| {
            let position_weight = total - index as u64;
            let class = match seg {
                RouteSegment::Static(_) => STATIC_WEIGHT,
                RouteSegment::Parameter(p) if p.constraint.is_some() => CONSTRAINED_WEIGHT,
                RouteSegment::Parameter(_) => PARAM_WEIGHT,
                RouteSegment::Wildcard => WILDCARD_WEIGHT,
            };
            position_weight.saturating_mul(class)
        })
        .fold(0, u64::saturating_add)
}

/// Compiles routes and memoizes the result per cache key.
#[derive(Debug, Default)]
pub struct RouteCompiler {
    cache: HashMap<String, Arc<CompiledRoute>>,
}

impl RouteCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `route`, returning the cached instance when its key was seen
    /// before.
    pub fn compile(&mut self, route: Route) -> RouteResult<Arc<CompiledRoute>> {
        let key = cache_key(&route);
        if let Some(compiled) = self.cache.get(&key) {
            tracing::trace!(key = %key, "compile cache hit");
            return Ok(Arc::clone(compiled));
        }

        let segments = split_path(&route.path)
            .map(|token| RouteSegment::parse(token, &route.constraints))
            .collect::<RouteResult<Vec<_>>>()?;

        let param_names = segments
            .iter()
            .filter_map(|seg| match seg {
                RouteSegment::Parameter(p) => Some(p.name.clone()),
                _ => None,
            })
            .collect();
        let static_count = segments
            .iter()
            .filter(|seg| matches!(seg, RouteSegment::Static(_)))
            .count();

        let compiled = Arc::new(CompiledRoute {
            priority: priority(&segments),
            dynamic_count: segments.len() - static_count,
            static_count,
            param_names,
            segments,
            route: Arc::new(route),
            key: key.clone(),
        });

        tracing::debug!(
            key = %key,
            priority = compiled.priority,
            segments = compiled.segments.len(),
            "Route compiled"
        );
        self.cache.insert(key, Arc::clone(&compiled));
        Ok(compiled)
    }

    pub fn get(&self, key: &str) -> Option<&Arc<CompiledRoute>> {
        self.cache.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.cache.contains_key(key)
    }

    /// Drop one entry from the compile cache.
    pub fn evict(&mut self, key: &str) -> Option<Arc<CompiledRoute>> {
        self.cache.remove(key)
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }
}
