use crate::domain::media::SourceMediaInfo;
use crate::error::ProbeError;
use crate::ports::command::{run_checked, CommandRunner};
use crate::ports::media::MediaProbe;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

pub struct FfprobeProbe {
    runner: Arc<dyn CommandRunner>,
    program: String,
}

impl FfprobeProbe {
    pub fn new(runner: Arc<dyn CommandRunner>, program: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
        }
    }

    fn duration_args(path: &Path) -> Vec<String> {
        vec![
            "-v".into(),
            "quiet".into(),
            "-show_entries".into(),
            "format=duration".into(),
            "-of".into(),
            "default=noprint_wrappers=1:nokey=1".into(),
            path.to_string_lossy().into_owned(),
        ]
    }

    fn streams_args(path: &Path) -> Vec<String> {
        vec![
            "-v".into(),
            "quiet".into(),
            "-print_format".into(),
            "json".into(),
            "-show_streams".into(),
            "-show_format".into(),
            path.to_string_lossy().into_owned(),
        ]
    }
}

#[async_trait]
impl MediaProbe for FfprobeProbe {
    async fn probe(&self, path: &Path) -> Result<SourceMediaInfo, ProbeError> {
        let runner = self.runner.as_ref();
        let duration = run_checked(runner, &self.program, &Self::duration_args(path)).await?;
        let streams = run_checked(runner, &self.program, &Self::streams_args(path)).await?;

        SourceMediaInfo::from_probe(
            path,
            &String::from_utf8_lossy(&duration.stdout),
            &String::from_utf8_lossy(&streams.stdout),
        )
    }
}
