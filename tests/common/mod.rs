//! Shared utilities for integration tests.

#![allow(dead_code)]

use trie_router::routing::{HandlerContext, HandlerResponse};
use trie_router::{HandlerRef, HttpMethod, Route, RouteMatch, Router};

/// Handler answering with a fixed tag, so tests can tell routes apart.
pub fn tagged(tag: &'static str) -> HandlerRef {
    HandlerRef::from_fn(move |_ctx: HandlerContext| HandlerResponse::text(200, tag))
}

pub fn route(method: HttpMethod, path: &str, tag: &'static str) -> Route {
    Route::new(method, path, tagged(tag))
}

/// Router with one tagged GET route per `(path, tag)` pair.
pub fn get_router(routes: &[(&str, &'static str)]) -> Router {
    let mut router = Router::new();
    for (path, tag) in routes {
        router
            .add_route(route(HttpMethod::Get, path, tag))
            .expect("route compiles");
    }
    router
}

/// Invoke the matched handler and return its body.
pub fn tag_of(m: &RouteMatch) -> String {
    let ctx = HandlerContext {
        method: m.route.method,
        path: m.route.path.clone(),
        domain: None,
        params: m.params.clone(),
    };
    m.route.handler.call(ctx).body
}

/// Minimal valid TOML route table.
pub const ROUTE_TABLE: &str = r#"
[cache]
capacity = 64

[[routes]]
method = "GET"
path = "/health"
handler = "health"
body = "ok"

[[routes]]
method = "GET"
path = "/users/{id}"
handler = "users.show"
constraints = { id = '\d+' }

[[routes]]
method = "GET"
path = "/users/me"
handler = "users.me"
body = "me"

[[routes]]
method = "POST"
path = "/users"
handler = "users.create"
status = 201
body = "created"

[[routes]]
method = "GET"
path = "/assets/*"
handler = "assets"
"#;
