//! HTTP routes for the mock provider

mod assertion;
mod key;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the router with all routes mounted under `prefix`
pub fn create_router(state: Arc<AppState>, prefix: &str) -> Router {
    let routes = Router::new()
        .route("/key", get(key::get_key))
        .route("/assertion", get(assertion::issue_assertion))
        .route("/login", get(assertion::issue_assertion));

    // nest() requires a leading slash and no trailing one
    let prefix = prefix.trim_matches('/');
    let routes = if prefix.is_empty() {
        routes
    } else {
        Router::new().nest(&format!("/{}", prefix), routes)
    };

    routes.layer(TraceLayer::new_for_http()).with_state(state)
}
