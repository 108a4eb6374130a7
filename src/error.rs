//! Error types for every stage of the encoder.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Failure of an external tool (ffmpeg, ffprobe, packager, publish command).
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{program} exited with {status}: {stderr}")]
    Exit {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error(transparent)]
    Tool(#[from] ToolError),
    #[error("unparsable probe output: {0}")]
    Parse(String),
    #[error("no video stream in {0}")]
    NoVideoStream(PathBuf),
}

#[derive(Debug, Error)]
pub enum ThumbnailError {
    #[error(transparent)]
    Tool(#[from] ToolError),
    #[error("image processing failed: {0}")]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("thumbnail task aborted: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("failed to walk {path}: {message}")]
    Walk { path: PathBuf, message: String },
    #[error("s3 upload of {key} failed: {message}")]
    S3 { key: String, message: String },
    #[error(transparent)]
    Tool(#[from] ToolError),
    #[error("invalid store configuration: {0}")]
    Config(String),
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("cannot sign catalog request: {0}")]
    Token(#[from] AuthError),
    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("catalog answered {status} for {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}

/// Token failures. Every verification failure is `Rejected`, whatever the cause.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("authorization rejected")]
    Rejected,
    #[error("cannot sign token: {0}")]
    Sign(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Terminal failure of one pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("probing source failed: {0}")]
    Probe(#[from] ProbeError),
    #[error("preparing workspace failed: {0}")]
    Workspace(#[source] io::Error),
    #[error("encoding rendition {rendition} failed: {source}")]
    Encode {
        rendition: String,
        #[source]
        source: ToolError,
    },
    #[error("probing rendition {rendition} failed: {source}")]
    ProbeRendition {
        rendition: String,
        #[source]
        source: ProbeError,
    },
    #[error("encoding audio failed: {0}")]
    EncodeAudio(#[source] ToolError),
    #[error("building manifest failed: {0}")]
    Manifest(#[source] ToolError),
    #[error("extracting thumbnail failed: {0}")]
    Thumbnail(#[from] ThumbnailError),
    #[error("publishing failed: {0}")]
    Publish(#[from] PublishError),
}
