//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate methods, path shape and addresses
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Constraint regexes are checked when routes are compiled, not here

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::RouterConfig;
use crate::routing::HttpMethod;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("route #{index}: unknown method `{method}`")]
    UnknownMethod { index: usize, method: String },

    #[error("route #{index}: path `{path}` must start with '/'")]
    InvalidPath { index: usize, path: String },

    #[error("route #{index}: handler must not be empty")]
    EmptyHandler { index: usize },

    #[error("cache.capacity must be greater than zero")]
    ZeroCacheCapacity,

    #[error("{field}: `{value}` is not a socket address")]
    InvalidAddress { field: &'static str, value: String },
}

pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.cache.enabled && config.cache.capacity == 0 {
        errors.push(ValidationError::ZeroCacheCapacity);
    }

    for (index, route) in config.routes.iter().enumerate() {
        if route.method.parse::<HttpMethod>().is_err() {
            errors.push(ValidationError::UnknownMethod {
                index,
                method: route.method.clone(),
            });
        }
        if !route.path.starts_with('/') {
            errors.push(ValidationError::InvalidPath {
                index,
                path: route.path.clone(),
            });
        }
        if route.handler.trim().is_empty() {
            errors.push(ValidationError::EmptyHandler { index });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
