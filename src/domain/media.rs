use crate::error::ProbeError;
use serde_json::Value;
use std::path::Path;

/// Technical profile of a media file, as reported by ffprobe.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceMediaInfo {
    pub width: u32,
    pub height: u32,
    /// Seconds.
    pub duration: f64,
    pub frame_rate: f64,
    /// Bits per second.
    pub bitrate: u64,
    pub codec: String,
}

impl SourceMediaInfo {
    /// Landscape at 16:9 or wider, compared in integers.
    pub fn is_wide(&self) -> bool {
        u64::from(self.width) * 9 >= u64::from(self.height) * 16
    }

    /// Builds the profile from the two ffprobe outputs: the bare container
    /// duration and the JSON stream listing.
    pub fn from_probe(
        path: &Path,
        duration_out: &str,
        streams_out: &str,
    ) -> Result<Self, ProbeError> {
        let duration = parse_duration(duration_out)?;

        let data: Value = serde_json::from_str(streams_out)
            .map_err(|e| ProbeError::Parse(format!("stream listing is not JSON: {}", e)))?;
        let streams = data
            .get("streams")
            .and_then(Value::as_array)
            .ok_or_else(|| ProbeError::Parse("missing streams array".to_string()))?;

        let video = streams
            .iter()
            .find(|s| s.get("codec_type").and_then(Value::as_str) == Some("video"))
            .ok_or_else(|| ProbeError::NoVideoStream(path.to_path_buf()))?;

        let width = dimension(video, "width")?;
        let height = dimension(video, "height")?;

        let frame_rate = video
            .get("avg_frame_rate")
            .and_then(Value::as_str)
            .ok_or_else(|| ProbeError::Parse("missing avg_frame_rate".to_string()))
            .and_then(parse_frame_rate)?;

        // Matroska and WebM only carry a container-level bitrate.
        let bitrate = integer_field(video, "bit_rate")
            .or_else(|| data.get("format").and_then(|f| integer_field(f, "bit_rate")))
            .unwrap_or(0);

        let codec = video
            .get("codec_name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Ok(Self {
            width,
            height,
            duration,
            frame_rate,
            bitrate,
            codec,
        })
    }
}

pub fn parse_duration(raw: &str) -> Result<f64, ProbeError> {
    let trimmed = raw.trim();
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && *d >= 0.0)
        .ok_or_else(|| ProbeError::Parse(format!("invalid duration {:?}", trimmed)))
}

/// Parses an ffprobe rate such as `30000/1001`. A zero denominator yields 0.
pub fn parse_frame_rate(raw: &str) -> Result<f64, ProbeError> {
    let invalid = || ProbeError::Parse(format!("invalid frame rate {:?}", raw));

    let (num, den) = match raw.split_once('/') {
        Some((num, den)) => (num, den),
        None => (raw, "1"),
    };
    let num: f64 = num.trim().parse().map_err(|_| invalid())?;
    let den: f64 = den.trim().parse().map_err(|_| invalid())?;

    if den == 0.0 {
        return Ok(0.0);
    }
    Ok(num / den)
}

fn dimension(stream: &Value, key: &str) -> Result<u32, ProbeError> {
    stream
        .get(key)
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .filter(|v| *v > 0)
        .ok_or_else(|| ProbeError::Parse(format!("missing or zero {}", key)))
}

// ffprobe prints bit_rate as a string; tolerate plain numbers as well.
fn integer_field(value: &Value, key: &str) -> Option<u64> {
    match value.get(key)? {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}
