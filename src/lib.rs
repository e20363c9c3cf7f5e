//! Trie-based HTTP route matching.
//!
//! Routes are compiled into segment lists, inserted into prefix tries (one
//! per method plus a combined one) and matched by priority with an LRU cache
//! in front. The `http` subsystem serves a route table over Axum.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::schema::RouterConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{HandlerRef, HttpMethod, Route, RouteMatch, Router};
