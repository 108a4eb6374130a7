//! mystream encoder - Upload to adaptive streaming package
//!
//! Hexagonal Architecture:
//! - domain/: Pure business logic (media profile, rendition planning, layout, outcomes)
//! - ports/: Trait definitions (command runner, media tools, storage, catalog)
//! - adapters/: Concrete implementations (ffmpeg, packager, S3, catalog API, HTTP intake)
//! - application/: Pipeline service and upload listener
//! - auth: Upload tokens
//! - config: JSON and environment configuration

pub mod adapters;
pub mod application;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;

pub use auth::{TokenCodec, VideoId};
pub use config::Config;
