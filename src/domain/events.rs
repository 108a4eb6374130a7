use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Emitted once an upload has been fully written to disk.
#[derive(Debug, Clone)]
pub struct UploadEvent {
    pub upload_id: String,
    /// Headers of the request that completed the upload.
    pub headers: HeaderMap,
    /// Where the raw upload was written.
    pub stored_path: PathBuf,
}

impl UploadEvent {
    pub fn authorization(&self) -> Option<&str> {
        self.headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
    }
}

/// Sidecar written next to a raw upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadInfo {
    pub id: String,
    pub size: u64,
    pub video_id: String,
}
