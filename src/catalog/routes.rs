use axum::{Router, routing::get};

use super::{CatalogResource, handler};
use crate::handler::{AppState, healthcheck};
use crate::model::{Author, Book, Category};

/// The `/api` router: one resource route pair per catalog entity.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(healthcheck))
        .merge(resource_routes::<Author>())
        .merge(resource_routes::<Category>())
        .merge(resource_routes::<Book>())
        .fallback(handler::route_not_found)
}

fn resource_routes<R: CatalogResource>() -> Router<AppState> {
    let collection = format!("/{}", R::COLLECTION);
    let member = format!("/{}/:id", R::COLLECTION);

    Router::new()
        .route(&collection, get(handler::index::<R>).post(handler::store::<R>))
        .route(
            &member,
            get(handler::show::<R>)
                .put(handler::update::<R>)
                .patch(handler::update::<R>)
                .delete(handler::destroy::<R>),
        )
}
