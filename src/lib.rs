use axum::{Router, http::Method, routing::get};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod api;
pub mod assets;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod handler;
pub mod model;

use handler::AppState;

/// Builds the full application router: the JSON API under `/api`, the UI pages
/// and the embedded static assets.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers(Any);

    let mut router = Router::new().nest("/api", catalog::routes());
    for page in assets::PAGES {
        router = router.route(page, get(assets::serve_index));
    }

    router
        .fallback(assets::serve_embedded)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
        .with_state(state)
}
