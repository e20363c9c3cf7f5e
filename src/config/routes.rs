//! Route table construction from configuration.

use serde_json::json;

use crate::config::loader::ConfigError;
use crate::config::schema::{RouteConfig, RouterConfig};
use crate::routing::{
    Handler, HandlerContext, HandlerRef, HandlerResponse, MatchCache, Route, Router,
};

/// Handler backing a configured route.
///
/// Responds with the fixed body when one is configured, otherwise with a
/// JSON description of the match.
#[derive(Debug, Clone)]
pub struct ConfigHandler {
    pub id: String,
    pub status: u16,
    pub body: Option<String>,
}

impl Handler for ConfigHandler {
    fn call(&self, ctx: HandlerContext) -> HandlerResponse {
        match &self.body {
            Some(body) => HandlerResponse::text(self.status, body.clone()),
            None => HandlerResponse::json(
                self.status,
                &json!({
                    "handler": self.id,
                    "method": ctx.method,
                    "path": ctx.path,
                    "domain": ctx.domain,
                    "params": ctx.params,
                }),
            ),
        }
    }
}

impl RouteConfig {
    /// Turn this definition into a registrable route.
    pub fn to_route(&self) -> Result<Route, ConfigError> {
        let handler = ConfigHandler {
            id: self.handler.clone(),
            status: self.status,
            body: self.body.clone(),
        };
        let mut route = Route::new(
            self.method.parse()?,
            self.path.clone(),
            HandlerRef::new(handler),
        );
        route.name = self.name.clone();
        route.constraints = self.constraints.clone();
        Ok(route)
    }
}

impl RouterConfig {
    /// Build a router holding every configured route, in order.
    pub fn build_router(&self) -> Result<Router, ConfigError> {
        let cache = if self.cache.enabled {
            MatchCache::new(self.cache.capacity)
        } else {
            MatchCache::disabled()
        };
        let mut router = Router::with_cache(cache);
        for route in &self.routes {
            router.add_route(route.to_route()?)?;
        }
        tracing::info!(
            routes = router.len(),
            nodes = router.stats().combined_nodes,
            cache_enabled = self.cache.enabled,
            "Route table built"
        );
        Ok(router)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::loader::parse_config;

    const TABLE: &str = r#"
        [[routes]]
        method = "GET"
        path = "/users/{id}"
        handler = "users.show"
        constraints = { id = '\d+' }

        [[routes]]
        method = "GET"
        path = "/ping"
        handler = "ping"
        body = "pong"
    "#;

    #[test]
    fn test_build_router_from_config() {
        let router = parse_config(TABLE).unwrap().build_router().unwrap();
        assert_eq!(router.len(), 2);
        assert!(router.match_route("/users/12", "GET", None).is_some());
        assert!(router.match_route("/users/ada", "GET", None).is_none());
    }

    #[test]
    fn test_config_handler_responses() {
        let router = parse_config(TABLE).unwrap().build_router().unwrap();

        let m = router.match_route("/ping", "GET", None).unwrap();
        let ctx = HandlerContext {
            method: m.route.method,
            path: "/ping".into(),
            domain: None,
            params: m.params.clone(),
        };
        assert_eq!(m.route.handler.call(ctx).body, "pong");

        let m = router.match_route("/users/7", "GET", Some("api.local")).unwrap();
        let ctx = HandlerContext {
            method: m.route.method,
            path: "/users/7".into(),
            domain: Some("api.local".into()),
            params: m.params.clone(),
        };
        let res = m.route.handler.call(ctx);
        assert_eq!(res.content_type, "application/json");
        let body: serde_json::Value = serde_json::from_str(&res.body).unwrap();
        assert_eq!(body["handler"], "users.show");
        assert_eq!(body["method"], "GET");
        assert_eq!(body["params"]["id"], "7");
        assert_eq!(body["domain"], "api.local");
    }

    #[test]
    fn test_bad_constraint_surfaces_as_route_error() {
        let config = parse_config(
            r#"
            [[routes]]
            method = "GET"
            path = "/x/{id}"
            handler = "x"
            constraints = { id = "(" }
            "#,
        )
        .unwrap();
        let err = config.build_router().unwrap_err();
        assert!(matches!(err, ConfigError::Route(_)));
    }
}
