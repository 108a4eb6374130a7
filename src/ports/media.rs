//! Media tool ports: probing, encoding, packaging and thumbnails.

use crate::domain::media::SourceMediaInfo;
use crate::error::{ProbeError, ThumbnailError, ToolError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// One video-only encode.
#[derive(Debug, Clone, PartialEq)]
pub struct RenditionEncode {
    pub src: PathBuf,
    pub dst: PathBuf,
    /// Pixels, or -1 to follow the aspect ratio.
    pub width: i32,
    pub height: i32,
    pub codec: String,
    pub frame_rate: f64,
    /// Kilobits per second.
    pub bitrate: u32,
}

/// The audio-only encode of a source.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioEncode {
    pub src: PathBuf,
    pub dst: PathBuf,
    pub codec: String,
    pub channels: u32,
    /// Kilobits per second.
    pub bitrate: u32,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaProbe: Send + Sync {
    async fn probe(&self, path: &Path) -> Result<SourceMediaInfo, ProbeError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EncodeEngine: Send + Sync {
    async fn encode_video(&self, job: &RenditionEncode) -> Result<(), ToolError>;

    async fn encode_audio(&self, job: &AudioEncode) -> Result<(), ToolError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ManifestBuilder: Send + Sync {
    /// Packages `audio` and `videos` into a manifest at `dst`. All outputs
    /// land in `dst`'s directory.
    async fn build_manifest(
        &self,
        dst: &Path,
        audio: &Path,
        videos: &[PathBuf],
    ) -> Result<(), ToolError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ThumbnailExtractor: Send + Sync {
    /// Writes a cover image taken `position` seconds into `src`.
    async fn extract(&self, src: &Path, dst: &Path, position: f64) -> Result<(), ThumbnailError>;
}
