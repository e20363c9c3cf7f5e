//! Route definitions as registered by callers.

use std::collections::BTreeMap;
use std::fmt;

use crate::routing::handler::HandlerRef;
use crate::routing::method::HttpMethod;

/// A registered (method, pattern) pair and the handler it resolves to.
///
/// Constraints are kept key-sorted so that their serialization into the
/// compile cache key does not depend on insertion order.
#[derive(Clone)]
pub struct Route {
    pub method: HttpMethod,
    pub path: String,
    pub handler: HandlerRef,
    pub name: Option<String>,
    pub constraints: BTreeMap<String, String>,
}

impl Route {
    pub fn new(method: HttpMethod, path: impl Into<String>, handler: HandlerRef) -> Self {
        Self {
            method,
            path: path.into(),
            handler,
            name: None,
            constraints: BTreeMap::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Constrain parameter `param` to values matching `pattern` (anchored).
    pub fn with_constraint(mut self, param: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.constraints.insert(param.into(), pattern.into());
        self
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("name", &self.name)
            .field("constraints", &self.constraints)
            .finish()
    }
}
