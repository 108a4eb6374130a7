use super::AppState;
use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use tracing::warn;

/// Rejects requests without a valid upload token and hands the verified
/// video identity to the handler as an extension.
pub async fn require_bearer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    match state.codec.verify_bearer(header) {
        Ok(video_id) => {
            req.extensions_mut().insert(video_id);
            Ok(next.run(req).await)
        }
        Err(_) => {
            warn!("rejected upload from {}: invalid authorization", req.uri());
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}
