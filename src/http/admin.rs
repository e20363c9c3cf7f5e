//! Route table introspection endpoints.

use axum::{extract::State, Json};

use crate::http::server::AppState;
use crate::routing::{RouteInfo, RouterStats};

/// Path prefix reserved for introspection.
pub const ADMIN_PREFIX: &str = "/_router";

/// `GET /_router/routes`: compiled routes in registration order.
pub async fn get_routes(State(state): State<AppState>) -> Json<Vec<RouteInfo>> {
    Json(state.router.load().route_infos())
}

/// `GET /_router/stats`: table, matcher and cache counters.
pub async fn get_stats(State(state): State<AppState>) -> Json<RouterStats> {
    Json(state.router.load().stats())
}
