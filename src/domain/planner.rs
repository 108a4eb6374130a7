//! Rendition selection.
//!
//! Tiers are matched against the source on frame rate and on the dimension
//! that governs its aspect class: width for sources at 16:9 or wider,
//! height otherwise. Selected tiers share one bitrate scale so that no
//! rendition asks for more than the source carries.

use super::media::SourceMediaInfo;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Marker for the dimension ffmpeg derives from the aspect ratio.
pub const AUTO: i32 = -1;

/// A configured quality target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityTier {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub frame_rate: f64,
    /// Kilobits per second.
    pub bitrate: u32,
    /// Minimum source frame rate for this tier to apply.
    #[serde(default)]
    pub fps_filter: f64,
    /// Already-encoded tiers that may replace the upload as encode input.
    #[serde(default)]
    pub prior_src: Vec<String>,
}

/// One rendition to encode.
#[derive(Debug, Clone, PartialEq)]
pub struct RenditionPlan {
    pub name: String,
    /// Target width or [`AUTO`].
    pub width: i32,
    /// Target height or [`AUTO`].
    pub height: i32,
    pub frame_rate: f64,
    /// Scaled kilobits per second.
    pub bitrate: u32,
    pub prior_src: Vec<String>,
}

impl RenditionPlan {
    /// Outputs of earlier renditions to try as input, in preference order.
    pub fn candidate_sources(&self, encode_dir: &Path) -> Vec<PathBuf> {
        self.prior_src
            .iter()
            .map(|name| encode_dir.join(format!("{}.mp4", name)))
            .collect()
    }
}

/// Selects and scales the renditions for `info`. An empty result is valid.
pub fn plan(info: &SourceMediaInfo, tiers: &[QualityTier]) -> Vec<RenditionPlan> {
    let wide = info.is_wide();

    let selected: Vec<&QualityTier> = tiers
        .iter()
        .filter(|tier| {
            let keep = info.frame_rate >= tier.fps_filter
                && if wide {
                    info.width >= tier.width
                } else {
                    info.height >= tier.height
                };
            if !keep {
                debug!(
                    tier = %tier.name,
                    "tier skipped for source {}x{}@{:.2}",
                    info.width,
                    info.height,
                    info.frame_rate
                );
            }
            keep
        })
        .collect();

    let max_bitrate = selected.iter().map(|t| t.bitrate).max().unwrap_or(0);
    let scale = bitrate_scale(info.bitrate, max_bitrate);

    selected
        .into_iter()
        .map(|tier| {
            let (width, height) = if wide {
                (tier.width as i32, AUTO)
            } else {
                (AUTO, tier.height as i32)
            };
            RenditionPlan {
                name: tier.name.clone(),
                width,
                height,
                frame_rate: tier.frame_rate,
                bitrate: (f64::from(tier.bitrate) * scale) as u32,
                prior_src: tier.prior_src.clone(),
            }
        })
        .collect()
}

/// `min(1, source_bps / (1000 * max_tier_kbps))`.
///
/// An unknown source bitrate (0) leaves tiers at their nominal rate.
pub fn bitrate_scale(source_bps: u64, max_tier_kbps: u32) -> f64 {
    if source_bps == 0 || max_tier_kbps == 0 {
        return 1.0;
    }
    (source_bps as f64 / (1000.0 * f64::from(max_tier_kbps))).min(1.0)
}
