//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, dispatch fallback)
//!     → request.rs (method, path, host)
//!     → routing::Router::match_route
//!     → matched Handler → HTTP response
//!
//! /_router/* → admin.rs (route table introspection)
//! ```

pub mod admin;
pub mod request;
pub mod server;

pub use request::{normalize_host, request_domain};
pub use server::{AppState, HttpServer};
