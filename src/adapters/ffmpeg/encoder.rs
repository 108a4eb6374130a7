use crate::error::ToolError;
use crate::ports::command::{run_checked, CommandRunner};
use crate::ports::media::{AudioEncode, EncodeEngine, RenditionEncode};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Where video encoding runs. Audio is always encoded in software.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeBackend {
    Software,
    Cuda,
}

impl EncodeBackend {
    pub fn from_config(hwaccel: &str) -> Self {
        if hwaccel.eq_ignore_ascii_case("cuda") {
            EncodeBackend::Cuda
        } else {
            EncodeBackend::Software
        }
    }

    fn video_codec(self, codec: &str) -> String {
        match (self, codec) {
            (EncodeBackend::Cuda, "h264") => "h264_nvenc".to_string(),
            (EncodeBackend::Cuda, "hevc") => "hevc_nvenc".to_string(),
            _ => codec.to_string(),
        }
    }
}

fn audio_codec(codec: &str) -> &str {
    match codec {
        "opus" => "libopus",
        other => other,
    }
}

pub struct FfmpegEncoder {
    runner: Arc<dyn CommandRunner>,
    program: String,
    backend: EncodeBackend,
    gop_size: u32,
    preset: String,
}

impl FfmpegEncoder {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        program: impl Into<String>,
        backend: EncodeBackend,
        gop_size: u32,
        preset: impl Into<String>,
    ) -> Self {
        info!("video encoder backend: {:?}", backend);
        Self {
            runner,
            program: program.into(),
            backend,
            gop_size,
            preset: preset.into(),
        }
    }

    pub fn video_args(&self, job: &RenditionEncode) -> Vec<String> {
        let mut args = vec!["-y".to_string()];
        let scale = match self.backend {
            EncodeBackend::Software => "scale",
            EncodeBackend::Cuda => {
                args.extend([
                    "-hwaccel".to_string(),
                    "cuda".to_string(),
                    "-hwaccel_output_format".to_string(),
                    "cuda".to_string(),
                ]);
                "scale_cuda"
            }
        };
        let gop = self.gop_size.to_string();

        args.extend([
            "-i".to_string(),
            job.src.to_string_lossy().into_owned(),
            "-vf".to_string(),
            format!("{}={}:{}, fps={:.2}", scale, job.width, job.height, job.frame_rate),
            "-c:v".to_string(),
            self.backend.video_codec(&job.codec),
            "-b:v".to_string(),
            format!("{}K", job.bitrate),
            "-g".to_string(),
            gop.clone(),
            "-keyint_min".to_string(),
            gop,
            "-preset".to_string(),
            self.preset.clone(),
            "-an".to_string(),
            job.dst.to_string_lossy().into_owned(),
        ]);
        args
    }

    pub fn audio_args(job: &AudioEncode) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-i".to_string(),
            job.src.to_string_lossy().into_owned(),
            "-vn".to_string(),
            "-c:a".to_string(),
            audio_codec(&job.codec).to_string(),
            "-ac".to_string(),
            job.channels.to_string(),
            "-b:a".to_string(),
            format!("{}K", job.bitrate),
            job.dst.to_string_lossy().into_owned(),
        ]
    }
}

#[async_trait]
impl EncodeEngine for FfmpegEncoder {
    async fn encode_video(&self, job: &RenditionEncode) -> Result<(), ToolError> {
        run_checked(self.runner.as_ref(), &self.program, &self.video_args(job)).await?;
        Ok(())
    }

    async fn encode_audio(&self, job: &AudioEncode) -> Result<(), ToolError> {
        run_checked(self.runner.as_ref(), &self.program, &Self::audio_args(job)).await?;
        Ok(())
    }
}
