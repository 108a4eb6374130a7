//! Inbound HTTP adapter: upload intake.

mod auth;
mod upload;

use crate::auth::TokenCodec;
use crate::domain::events::UploadEvent;
use crate::domain::layout::WorkspaceLayout;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::post;
use axum::Router;
use tokio::sync::mpsc;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

pub use upload::{stream_to_file, UploadResponse};

#[derive(Clone)]
pub struct AppState {
    pub codec: TokenCodec,
    pub layout: WorkspaceLayout,
    pub events: mpsc::Sender<UploadEvent>,
}

pub fn router(state: AppState, max_upload_bytes: Option<usize>) -> Router {
    let mut uploads = Router::new()
        .route("/videos", post(upload::create))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer,
        ))
        .layer(DefaultBodyLimit::disable());

    if let Some(limit) = max_upload_bytes {
        uploads = uploads.layer(RequestBodyLimitLayer::new(limit));
    }

    uploads
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
