use super::AppState;
use crate::auth::VideoId;
use crate::domain::events::{UploadEvent, UploadInfo};
use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::{BoxError, Extension, Json};
use futures::{Stream, TryStreamExt};
use http_body_util::LengthLimitError;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio_util::io::StreamReader;
use tracing::{error, info};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub upload_id: String,
}

pub async fn create(
    State(state): State<AppState>,
    Extension(video_id): Extension<VideoId>,
    headers: HeaderMap,
    body: Body,
) -> Result<(StatusCode, Json<UploadResponse>), (StatusCode, String)> {
    let upload_id = Uuid::new_v4().to_string();
    let stored_path = state.layout.upload_path(&upload_id);
    let info_path = state.layout.upload_info_path(&upload_id);

    let size = match stream_to_file(&stored_path, body.into_data_stream()).await {
        Ok(size) => size,
        Err(err) => {
            let _ = tokio::fs::remove_file(&stored_path).await;
            return Err(upload_failure(err));
        }
    };

    let sidecar = UploadInfo {
        id: upload_id.clone(),
        size,
        video_id: video_id.to_string(),
    };
    if let Err(err) = write_info(&info_path, &sidecar).await {
        discard(&stored_path, &info_path).await;
        return Err((StatusCode::INTERNAL_SERVER_ERROR, err.to_string()));
    }

    let event = UploadEvent {
        upload_id: upload_id.clone(),
        headers,
        stored_path: stored_path.clone(),
    };
    if state.events.send(event).await.is_err() {
        error!(%upload_id, "upload queue is closed");
        discard(&stored_path, &info_path).await;
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "encoder is shutting down".to_string(),
        ));
    }

    info!(%upload_id, %video_id, size, "upload stored");
    Ok((StatusCode::CREATED, Json(UploadResponse { upload_id })))
}

// Save a `Stream` to a file, returning the number of bytes written
pub async fn stream_to_file<S, E>(path: &Path, stream: S) -> io::Result<u64>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Into<BoxError>,
{
    let body_with_io_error = stream.map_err(|err| io::Error::new(io::ErrorKind::Other, err));
    let body_reader = StreamReader::new(body_with_io_error);
    futures::pin_mut!(body_reader);

    let mut file = BufWriter::new(File::create(path).await?);
    let size = tokio::io::copy(&mut body_reader, &mut file).await?;
    file.flush().await?;

    Ok(size)
}

async fn write_info(path: &Path, info: &UploadInfo) -> io::Result<()> {
    let raw = serde_json::to_vec(info)?;
    tokio::fs::write(path, raw).await
}

async fn discard(stored_path: &Path, info_path: &Path) {
    let _ = tokio::fs::remove_file(stored_path).await;
    let _ = tokio::fs::remove_file(info_path).await;
}

fn upload_failure(err: io::Error) -> (StatusCode, String) {
    let mut source: Option<&(dyn std::error::Error + 'static)> = err.get_ref().map(|e| e as _);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return (StatusCode::PAYLOAD_TOO_LARGE, e.to_string());
        }
        source = e.source();
    }
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}
