pub mod admin;
pub mod assists;
pub mod error;
pub mod requests;

use crate::{AppState, openapi};
use axum::Router;
use tower_http::cors::CorsLayer;

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .merge(requests::router(state.clone()))
        .merge(admin::router(state.clone()))
        .merge(assists::router(state.clone()))
        .merge(openapi::router())
        .layer(CorsLayer::permissive());

    Router::new().nest("/api", api)
}
