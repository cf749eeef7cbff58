pub mod auth;
pub mod openapi;
pub mod routes;
pub mod storage;

#[cfg(test)]
mod tests;

use axum::Router;
use cq_core::{Civiq, CiviqError};
use cq_db::schema;
use cq_db::store::DbStore;
use std::path::PathBuf;
use std::sync::Arc;
use storage::LocalFileStorage;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub db_path: String,
    pub uploads_dir: PathBuf,
}

pub fn build_civiq(state: &AppState) -> Result<Civiq<DbStore>, CiviqError> {
    let conn =
        schema::open_and_migrate(&state.db_path).map_err(|err| CiviqError::Internal {
            message: err.to_string(),
        })?;
    let store = DbStore::new(conn);
    let files = Arc::new(LocalFileStorage::new(state.uploads_dir.clone()));
    Ok(Civiq::new(store, files))
}

pub fn app(state: AppState) -> Router {
    let uploads = ServeDir::new(state.uploads_dir.clone());
    routes::router(state)
        .nest_service("/uploads", uploads)
        .layer(TraceLayer::new_for_http())
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app(state)).await
}
