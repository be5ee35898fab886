use anyhow::{Context, Result};
use base64::{self, Engine};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::path::Path;

pub fn encode_png(capture: &DynamicImage) -> image::ImageResult<Vec<u8>> {
    let mut png_data = Vec::new();
    let mut cursor = Cursor::new(&mut png_data);
    capture.write_to(&mut cursor, ImageFormat::Png)?;
    Ok(png_data)
}

/// Captures travel between processes as base64 strings.
pub fn decode_base64(capture_data: &str) -> Result<DynamicImage> {
    let raw = base64::engine::general_purpose::STANDARD
        .decode(capture_data.trim())
        .context("Capture is not valid base64")?;
    let capture = image::load_from_memory(&raw).context("Capture is not a supported image")?;
    Ok(capture)
}

pub fn load_file(path: &Path) -> Result<DynamicImage> {
    image::open(path).with_context(|| format!("Failed to load image from {:?}", path))
}
