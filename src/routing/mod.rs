//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route registration:
//!     Route (method, pattern, handler, constraints)
//!     → compiler.rs (segments, priority, compile cache)
//!     → trie.rs (combined trie + per-method trie)
//!     → cache.rs (invalidate everything)
//!
//! Request dispatch:
//!     (path, method, domain)
//!     → cache.rs (hit? return)
//!     → matcher.rs (method trie, then combined trie)
//!     → cache.rs (store)
//!     → RouteMatch { route, params } or None
//! ```
//!
//! # Design Decisions
//! - Deterministic: specificity score breaks ties, static before parameter
//! - Lookup cost depends on path depth, not on the number of routes
//! - No match is `None`, never an error

pub mod cache;
pub mod compiler;
pub mod error;
pub mod handler;
pub mod matcher;
pub mod method;
pub mod route;
pub mod router;
pub mod segment;
pub mod stats;
pub mod trie;

pub use cache::{CacheKey, CacheStats, MatchCache};
pub use compiler::{CompiledRoute, RouteCompiler};
pub use error::{RouteError, RouteResult};
pub use handler::{Handler, HandlerContext, HandlerRef, HandlerResponse};
pub use matcher::RouteMatch;
pub use method::HttpMethod;
pub use route::Route;
pub use router::Router;
pub use segment::{RouteSegment, WILDCARD_PARAM};
pub use stats::{RouteInfo, RouterStats};
