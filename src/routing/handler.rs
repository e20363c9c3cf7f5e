//! Handler capability.
//!
//! The trie stores handlers and hands them back on a match; it never calls
//! them. Dispatch layers invoke [`Handler::call`] with the extracted context.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::routing::method::HttpMethod;

/// Request data handed to a matched handler.
#[derive(Debug, Clone)]
pub struct HandlerContext {
    pub method: HttpMethod,
    pub path: String,
    pub domain: Option<String>,
    pub params: HashMap<String, String>,
}

/// What a handler produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl HandlerResponse {
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            body: body.into(),
        }
    }

    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: value.to_string(),
        }
    }
}

/// Something that can answer a matched request.
pub trait Handler: Send + Sync {
    fn call(&self, ctx: HandlerContext) -> HandlerResponse;
}

impl<F> Handler for F
where
    F: Fn(HandlerContext) -> HandlerResponse + Send + Sync,
{
    fn call(&self, ctx: HandlerContext) -> HandlerResponse {
        self(ctx)
    }
}

/// Shared, type-erased handler reference.
#[derive(Clone)]
pub struct HandlerRef(Arc<dyn Handler>);

impl HandlerRef {
    pub fn new(handler: impl Handler + 'static) -> Self {
        Self(Arc::new(handler))
    }

    /// Wrap a closure.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(HandlerContext) -> HandlerResponse + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, ctx: HandlerContext) -> HandlerResponse {
        self.0.call(ctx)
    }

    /// True when both references point at the same handler instance.
    pub fn ptr_eq(&self, other: &HandlerRef) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }
}

impl fmt::Debug for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HandlerRef(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_handler() {
        let handler = HandlerRef::from_fn(|ctx: HandlerContext| {
            HandlerResponse::text(200, format!("hello {}", ctx.params["name"]))
        });

        let mut params = HashMap::new();
        params.insert("name".to_string(), "ada".to_string());
        let res = handler.call(HandlerContext {
            method: HttpMethod::Get,
            path: "/hello/ada".into(),
            domain: None,
            params,
        });

        assert_eq!(res.status, 200);
        assert_eq!(res.body, "hello ada");
    }

    #[test]
    fn test_ptr_eq() {
        let a = HandlerRef::from_fn(|_: HandlerContext| HandlerResponse::text(204, ""));
        let b = a.clone();
        let c = HandlerRef::from_fn(|_: HandlerContext| HandlerResponse::text(204, ""));
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
    }
}
