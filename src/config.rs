//! Service configuration, loaded once at startup.

use crate::domain::planner::QualityTier;
use crate::error::ConfigError;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::env;
use std::path::{Path, PathBuf};
use tracing::warn;

const DEFAULT_CONFIG_PATH: &str = "config.json";

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    /// HTTP bind address
    #[serde(default = "default_listen")]
    pub listen: String,
    /// Catalog API base URL, without trailing slash
    pub api_url: String,
    /// `"cuda"` selects the hardware encoder
    #[serde(default)]
    pub hwaccel: String,
    #[serde(default = "default_preset")]
    pub preset: String,
    #[serde(default = "default_gop_size")]
    pub gop_size: u32,
    #[serde(default)]
    pub qualities: Vec<QualityTier>,
    #[serde(default)]
    pub audio: AudioConfig,
    pub thumbnail: ThumbnailConfig,
    pub upload_sign_key: String,
    pub store: StoreConfig,
    /// Root of uploads and working directories
    #[serde(default = "default_videos_dir")]
    pub videos_dir: PathBuf,
    #[serde(default)]
    pub tools: ToolPaths,
    /// Optional cap on a single upload body
    #[serde(default)]
    pub max_upload_bytes: Option<usize>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct AudioConfig {
    pub codec: String,
    pub channels: u32,
    /// Kilobits per second
    pub bitrate: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            codec: "aac".to_string(),
            channels: 2,
            bitrate: 128,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ThumbnailConfig {
    pub width: u32,
    pub height: u32,
    /// JPEG quality, 1-100
    pub quality: u8,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct StoreConfig {
    #[serde(rename = "type")]
    pub kind: StoreKind,
    #[serde(default)]
    pub aws_endpoint: Option<String>,
    #[serde(default)]
    pub bucket: Option<String>,
    /// Program and arguments; `${src}` and `${dst}` are substituted
    #[serde(default)]
    pub command: Vec<String>,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[serde(alias = "S3")]
    S3,
    Command,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ToolPaths {
    pub ffmpeg: String,
    pub ffprobe: String,
    pub packager: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
            packager: "packager".to_string(),
        }
    }
}

fn default_listen() -> String {
    String::from("0.0.0.0:8080")
}

fn default_preset() -> String {
    String::from("medium")
}

fn default_gop_size() -> u32 {
    60
}

fn default_videos_dir() -> PathBuf {
    PathBuf::from("videos")
}

impl Config {
    /// Load configuration from `$ENCODER_CONFIG` (or `config.json`), then
    /// apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let path = env::var("ENCODER_CONFIG").unwrap_or_else(|_| String::from(DEFAULT_CONFIG_PATH));
        let mut config = Self::from_file(Path::new(&path))?;

        if let Ok(listen) = env::var("LISTEN") {
            config.listen = listen;
        }
        if let Ok(api_url) = env::var("API_URL") {
            config.api_url = api_url;
        }
        if let Ok(key) = env::var("UPLOAD_SIGN_KEY") {
            config.upload_sign_key = key;
        }
        if let Ok(dir) = env::var("VIDEOS_DIR") {
            config.videos_dir = PathBuf::from(dir);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let mut config: Config = serde_json::from_str(raw)?;
        config.api_url = config.api_url.trim_end_matches('/').to_string();
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upload_sign_key.is_empty() {
            return Err(ConfigError::Invalid("upload_sign_key is empty".into()));
        }
        if self.gop_size == 0 {
            return Err(ConfigError::Invalid("gop_size must be positive".into()));
        }
        if self.thumbnail.width == 0 || self.thumbnail.height == 0 {
            return Err(ConfigError::Invalid("thumbnail dimensions must be positive".into()));
        }
        if !(1..=100).contains(&self.thumbnail.quality) {
            return Err(ConfigError::Invalid("thumbnail quality must be within 1-100".into()));
        }
        match self.store.kind {
            StoreKind::S3 if self.store.bucket.as_deref().unwrap_or("").is_empty() => {
                return Err(ConfigError::Invalid("s3 store requires a bucket".into()));
            }
            StoreKind::Command if self.store.command.is_empty() => {
                return Err(ConfigError::Invalid("command store requires a command".into()));
            }
            _ => {}
        }
        validate_tiers(&self.qualities)
    }
}

/// Tier names must be unique and `prior_src` chains must not loop.
fn validate_tiers(tiers: &[QualityTier]) -> Result<(), ConfigError> {
    let mut by_name: HashMap<&str, &QualityTier> = HashMap::new();
    for tier in tiers {
        if tier.name.is_empty() || tier.name.contains(['/', '\\']) || tier.name == ".." {
            return Err(ConfigError::Invalid(format!("invalid tier name {:?}", tier.name)));
        }
        if tier.name == "audio" {
            return Err(ConfigError::Invalid("tier name \"audio\" is reserved".into()));
        }
        if by_name.insert(&tier.name, tier).is_some() {
            return Err(ConfigError::Invalid(format!("duplicate tier {:?}", tier.name)));
        }
    }

    for tier in tiers {
        for prior in &tier.prior_src {
            if !by_name.contains_key(prior.as_str()) {
                warn!(
                    tier = %tier.name,
                    "prior_src {:?} matches no tier and will never be used",
                    prior
                );
            }
        }
    }

    let mut done: HashSet<&str> = HashSet::new();
    for tier in tiers {
        let mut path = Vec::new();
        visit(&tier.name, &by_name, &mut path, &mut done)?;
    }
    Ok(())
}

fn visit<'a>(
    name: &'a str,
    by_name: &HashMap<&'a str, &'a QualityTier>,
    path: &mut Vec<&'a str>,
    done: &mut HashSet<&'a str>,
) -> Result<(), ConfigError> {
    if done.contains(name) {
        return Ok(());
    }
    if let Some(start) = path.iter().position(|n| *n == name) {
        let mut cycle: Vec<&str> = path[start..].to_vec();
        cycle.push(name);
        return Err(ConfigError::Invalid(format!(
            "prior_src cycle: {}",
            cycle.join(" -> ")
        )));
    }
    let Some(&tier) = by_name.get(name) else {
        return Ok(());
    };

    path.push(name);
    for prior in &tier.prior_src {
        visit(prior.as_str(), by_name, path, done)?;
    }
    path.pop();
    done.insert(name);
    Ok(())
}
