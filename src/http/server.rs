//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum app with the dispatch fallback and introspection routes
//! - Wire up middleware (tracing, timeout)
//! - Swap in a freshly built route table on config reload
//! - Serve until the shutdown signal fires

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::RouterConfig;
use crate::http::admin::{self, ADMIN_PREFIX};
use crate::http::request::request_domain;
use crate::routing::{HandlerContext, HandlerResponse, Router};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<ArcSwap<Router>>,
}

impl AppState {
    pub fn new(router: Router) -> Self {
        Self {
            router: Arc::new(ArcSwap::from_pointee(router)),
        }
    }

    /// Replace the live route table. In-flight requests keep the old one.
    pub fn swap(&self, router: Router) {
        self.router.store(Arc::new(router));
    }
}

/// HTTP front end for a route table.
pub struct HttpServer {
    app: axum::Router,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server serving `router`.
    pub fn new(config: RouterConfig, router: Router) -> Self {
        let state = AppState::new(router);
        let app = Self::build_app(&config, state.clone());
        Self { app, state }
    }

    /// Build the Axum app with all middleware layers.
    #[allow(deprecated)]
    fn build_app(config: &RouterConfig, state: AppState) -> axum::Router {
        axum::Router::new()
            .route(&format!("{ADMIN_PREFIX}/routes"), get(admin::get_routes))
            .route(&format!("{ADMIN_PREFIX}/stats"), get(admin::get_stats))
            .fallback(dispatch)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// The Axum app, for driving the server without a socket.
    pub fn app(&self) -> axum::Router {
        self.app.clone()
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Every config received on `config_updates` is compiled and swapped in;
    /// one that fails to build leaves the current table serving.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<RouterConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.state.router.load().len(),
            "HTTP server starting"
        );

        let state = self.state.clone();
        let reloader = tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                match config.build_router() {
                    Ok(router) => {
                        tracing::info!(routes = router.len(), "Route table reloaded");
                        state.swap(router);
                    }
                    Err(e) => tracing::error!(
                        error = %e,
                        "Failed to build reloaded route table; keeping current"
                    ),
                }
            }
        });

        axum::serve(listener, self.app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        reloader.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Fallback handler: match the request against the live table and call the
/// route's handler.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let path = request.uri().path().to_string();
    let domain = request_domain(&request);
    let method = request.method().as_str();

    let router = state.router.load();
    let Some(matched) = router.match_route(&path, method, domain.as_deref()) else {
        tracing::debug!(method = %method, path = %path, domain = ?domain, "No route matched");
        return (StatusCode::NOT_FOUND, "No matching route found").into_response();
    };

    tracing::debug!(
        method = %method,
        path = %path,
        route = %matched.route.path,
        priority = matched.priority(),
        "Route matched"
    );

    let ctx = HandlerContext {
        method: matched.route.method,
        path,
        domain,
        params: matched.params,
    };
    into_response(matched.route.handler.call(ctx))
}

fn into_response(res: HandlerResponse) -> Response {
    let status = StatusCode::from_u16(res.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(header::CONTENT_TYPE, res.content_type)], res.body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_response_maps_status_and_content_type() {
        let res = into_response(HandlerResponse::text(201, "made"));
        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(res.headers()[header::CONTENT_TYPE], "text/plain; charset=utf-8");

        let res = into_response(HandlerResponse::text(1000, "bad"));
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_swap_replaces_table() {
        let state = AppState::new(Router::new());
        assert!(state.router.load().is_empty());

        let mut next = Router::new();
        next.add_route(crate::routing::Route::new(
            crate::routing::HttpMethod::Get,
            "/",
            crate::routing::HandlerRef::from_fn(|_| HandlerResponse::text(200, "ok")),
        ))
        .unwrap();
        state.swap(next);
        assert_eq!(state.router.load().len(), 1);
    }
}
