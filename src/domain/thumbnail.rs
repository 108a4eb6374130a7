use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::ImageResult;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Crops the image at `path` to fill `width`x`height` around its center and
/// rewrites it in place as a JPEG of the given quality.
pub fn fill_in_place(path: &Path, width: u32, height: u32, quality: u8) -> ImageResult<()> {
    let frame = image::open(path)?;
    let filled = frame.resize_to_fill(width, height, FilterType::Lanczos3).to_rgb8();

    let mut writer = BufWriter::new(File::create(path)?);
    filled.write_with_encoder(JpegEncoder::new_with_quality(&mut writer, quality))?;
    writer.flush()?;
    Ok(())
}
