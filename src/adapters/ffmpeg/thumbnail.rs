use crate::config::ThumbnailConfig;
use crate::domain::thumbnail::fill_in_place;
use crate::error::ThumbnailError;
use crate::ports::command::{run_checked, CommandRunner};
use crate::ports::media::ThumbnailExtractor;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

/// Grabs one frame with ffmpeg, then crops and re-encodes it to the
/// configured size.
pub struct FfmpegThumbnailer {
    runner: Arc<dyn CommandRunner>,
    program: String,
    config: ThumbnailConfig,
}

impl FfmpegThumbnailer {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        program: impl Into<String>,
        config: ThumbnailConfig,
    ) -> Self {
        Self {
            runner,
            program: program.into(),
            config,
        }
    }

    fn frame_args(src: &Path, dst: &Path, position: f64) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-ss".to_string(),
            format!("{:.3}", position.max(0.0)),
            "-i".to_string(),
            src.to_string_lossy().into_owned(),
            "-vframes".to_string(),
            "1".to_string(),
            dst.to_string_lossy().into_owned(),
        ]
    }
}

#[async_trait]
impl ThumbnailExtractor for FfmpegThumbnailer {
    async fn extract(&self, src: &Path, dst: &Path, position: f64) -> Result<(), ThumbnailError> {
        let args = Self::frame_args(src, dst, position);
        run_checked(self.runner.as_ref(), &self.program, &args).await?;

        let dst = dst.to_path_buf();
        let ThumbnailConfig { width, height, quality } = self.config.clone();
        tokio::task::spawn_blocking(move || fill_in_place(&dst, width, height, quality)).await??;
        Ok(())
    }
}
