use crate::auth::VideoId;
use std::path::{Path, PathBuf};

/// Paths of uploads and per-video working directories under one root.
///
/// ```text
/// <root>/<upload_id>                 raw upload
/// <root>/<upload_id>.info            upload sidecar
/// <root>/<video_id>/encode/*.mp4     renditions and audio
/// <root>/<video_id>/dash/            manifest, segments, thumbnail
/// ```
#[derive(Debug, Clone)]
pub struct WorkspaceLayout {
    root: PathBuf,
}

impl WorkspaceLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn upload_path(&self, upload_id: &str) -> PathBuf {
        self.root.join(upload_id)
    }

    pub fn upload_info_path(&self, upload_id: &str) -> PathBuf {
        self.root.join(format!("{}.info", upload_id))
    }

    pub fn video_dir(&self, video_id: &VideoId) -> PathBuf {
        self.root.join(video_id.as_str())
    }

    pub fn encode_dir(&self, video_id: &VideoId) -> PathBuf {
        self.video_dir(video_id).join("encode")
    }

    pub fn dash_dir(&self, video_id: &VideoId) -> PathBuf {
        self.video_dir(video_id).join("dash")
    }

    pub fn rendition_path(&self, video_id: &VideoId, name: &str) -> PathBuf {
        self.encode_dir(video_id).join(format!("{}.mp4", name))
    }

    pub fn audio_path(&self, video_id: &VideoId) -> PathBuf {
        self.encode_dir(video_id).join("audio.mp4")
    }

    pub fn manifest_path(&self, video_id: &VideoId) -> PathBuf {
        self.dash_dir(video_id).join("video.mpd")
    }

    pub fn thumbnail_path(&self, video_id: &VideoId) -> PathBuf {
        self.dash_dir(video_id).join("thumbnail.jpg")
    }
}
