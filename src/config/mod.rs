//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RouterConfig (validated, immutable)
//!     → routes.rs (compile into a Router)
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → routes.rs builds a fresh Router
//!     → atomic swap of Arc<Router>; old cache dies with the old table
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod routes;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use routes::ConfigHandler;
pub use schema::{CacheConfig, ListenerConfig, ObservabilityConfig, RouteConfig, RouterConfig};
pub use validation::ValidationError;
