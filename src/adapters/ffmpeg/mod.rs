//! ffmpeg and ffprobe driven as subprocesses.

pub mod encoder;
pub mod probe;
pub mod thumbnail;

pub use encoder::{EncodeBackend, FfmpegEncoder};
pub use probe::FfprobeProbe;
pub use thumbnail::FfmpegThumbnailer;
