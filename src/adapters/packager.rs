use crate::domain::manifest::packager_args;
use crate::error::ToolError;
use crate::ports::command::{run_checked, CommandRunner};
use crate::ports::media::ManifestBuilder;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Shaka packager producing a DASH manifest and its segments.
pub struct ShakaPackager {
    runner: Arc<dyn CommandRunner>,
    program: String,
}

impl ShakaPackager {
    pub fn new(runner: Arc<dyn CommandRunner>, program: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
        }
    }
}

#[async_trait]
impl ManifestBuilder for ShakaPackager {
    async fn build_manifest(
        &self,
        dst: &Path,
        audio: &Path,
        videos: &[PathBuf],
    ) -> Result<(), ToolError> {
        let args = packager_args(dst, audio, videos);
        run_checked(self.runner.as_ref(), &self.program, &args).await?;
        Ok(())
    }
}
