//! Argument construction for the DASH packager.

use std::path::Path;

/// Builds the packager command line: one stream descriptor for the audio
/// track, one per video rendition, then the manifest output.
///
/// Segment files are written next to the manifest, so every descriptor's
/// `output=` points into the manifest's directory.
pub fn packager_args(manifest: &Path, audio: &Path, videos: &[impl AsRef<Path>]) -> Vec<String> {
    let dir = manifest.parent().unwrap_or_else(|| Path::new("."));

    let mut args = Vec::with_capacity(videos.len() + 3);
    args.push(descriptor(audio, "audio", dir));
    for video in videos {
        args.push(descriptor(video.as_ref(), "video", dir));
    }
    args.push("--mpd_output".to_string());
    args.push(manifest.display().to_string());
    args
}

fn descriptor(input: &Path, stream: &str, dir: &Path) -> String {
    let file_name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!(
        "in={},stream={},output={}",
        input.display(),
        stream,
        dir.join(file_name).display()
    )
}
