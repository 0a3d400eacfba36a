// Route definitions

use axum::{routing::get, Router};

use crate::AppState;

mod api;
mod pages;

pub fn create_router(app_state: AppState) -> Router {
    // REST API over the listing store
    let api_router = Router::new()
        .route("/cars", get(api::list_cars).post(api::create_car))
        .route(
            "/cars/:id",
            get(api::get_car).patch(api::update_car).delete(api::delete_car),
        )
        .route("/cars/:id/similar", get(api::similar_cars))
        .with_state(app_state.clone());

    Router::new()
        .route("/", get(pages::landing_page))
        .route("/cars", get(pages::catalog_page))
        .route("/cars/:id", get(pages::detail_page))
        .route("/cars/:id/:slug", get(pages::detail_page_with_slug))
        .nest("/api", api_router)
        .with_state(app_state)
}
