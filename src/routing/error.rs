//! Registration-time routing errors.
//!
//! A failed match is never an error; only building the route table can fail.

use thiserror::Error;

/// Errors raised while registering or compiling routes.
#[derive(Debug, Error)]
pub enum RouteError {
    /// A parameter constraint is not a valid regular expression.
    #[error("invalid constraint for parameter `{param}`: `{pattern}`: {source}")]
    InvalidConstraint {
        param: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The method is not one of the nine supported methods.
    #[error("unknown HTTP method: {0}")]
    UnknownMethod(String),
}

/// Result type for routing operations.
pub type RouteResult<T> = Result<T, RouteError>;
