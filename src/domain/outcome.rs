use super::media::SourceMediaInfo;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// States of one pipeline run, in the order a successful run visits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Probing,
    Planning,
    Encoding { index: usize, total: usize },
    EncodingAudio,
    Packaging,
    Thumbnailing,
    Publishing,
    Notifying,
    CleaningUp,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Probing => f.write_str("probing"),
            Stage::Planning => f.write_str("planning"),
            Stage::Encoding { index, total } => write!(f, "encoding {}/{}", index + 1, total),
            Stage::EncodingAudio => f.write_str("encoding audio"),
            Stage::Packaging => f.write_str("packaging"),
            Stage::Thumbnailing => f.write_str("thumbnailing"),
            Stage::Publishing => f.write_str("publishing"),
            Stage::Notifying => f.write_str("notifying"),
            Stage::CleaningUp => f.write_str("cleaning up"),
            Stage::Done => f.write_str("done"),
            Stage::Failed => f.write_str("failed"),
        }
    }
}

/// An encoded rendition and the profile probed from its output.
#[derive(Debug, Clone, PartialEq)]
pub struct RenditionResult {
    pub name: String,
    pub path: PathBuf,
    pub info: SourceMediaInfo,
}

#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub source: SourceMediaInfo,
    /// Highest encoded bitrate first.
    pub renditions: Vec<RenditionResult>,
    pub audio: PathBuf,
    pub manifest: PathBuf,
    pub thumbnail: PathBuf,
}

impl PipelineOutcome {
    /// Catalog payload for a finished video.
    ///
    /// Dimensions come from the top rendition; an audio-only package
    /// reports the source's.
    pub fn ready_report(&self, posted_at: DateTime<Utc>) -> ReadyReport {
        let top = self
            .renditions
            .first()
            .map(|r| &r.info)
            .unwrap_or(&self.source);
        ReadyReport {
            width: top.width,
            height: top.height,
            frame_rate: top.frame_rate as i64,
            duration: self.source.duration,
            status: "ACTIVE",
            posted_at,
        }
    }
}

/// Sorts by descending encoded bitrate, keeping plan order among equals.
pub fn sort_by_bitrate(results: &mut [RenditionResult]) {
    results.sort_by(|a, b| b.info.bitrate.cmp(&a.info.bitrate));
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadyReport {
    pub width: u32,
    pub height: u32,
    pub frame_rate: i64,
    pub duration: f64,
    pub status: &'static str,
    pub posted_at: DateTime<Utc>,
}
