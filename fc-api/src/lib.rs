//! fc-api library - HTTP surface of the fit-and-competent application API
//!
//! Clients allocate an application number with `POST /applications` and later
//! fill it in, once, with `PUT /applications/:id`.

use std::sync::Arc;

use axum::Router;
use fc_common::allocator::{IdSource, ThreadRngSource};
use fc_common::ApplicationStore;
use tower_http::trace::TraceLayer;

pub mod api;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Record store
    pub store: Arc<dyn ApplicationStore>,
    /// Candidate source for new application numbers
    pub ids: Arc<dyn IdSource>,
    /// Normalized path prefix the application routes are mounted under
    pub path_prefix: String,
}

impl AppState {
    /// Create state with the production random number source
    pub fn new(store: Arc<dyn ApplicationStore>, path_prefix: impl Into<String>) -> Self {
        Self::with_id_source(store, Arc::new(ThreadRngSource), path_prefix)
    }

    pub fn with_id_source(
        store: Arc<dyn ApplicationStore>,
        ids: Arc<dyn IdSource>,
        path_prefix: impl Into<String>,
    ) -> Self {
        Self {
            store,
            ids,
            path_prefix: path_prefix.into(),
        }
    }

    /// Public URL path of an application resource
    pub fn application_location(&self, id: u32) -> String {
        format!("{}/applications/{}", self.path_prefix, id)
    }
}

/// Build application router
///
/// Application routes and a health check live under the path prefix; a
/// second health check is served at `/health` for load balancer probes.
pub fn build_router(state: AppState) -> Router {
    let prefixed = Router::new()
        .merge(api::application_routes())
        .merge(api::health_routes());

    let router = if state.path_prefix.is_empty() {
        prefixed
    } else {
        Router::new()
            .nest(&state.path_prefix, prefixed)
            .merge(api::health_routes())
    };

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
