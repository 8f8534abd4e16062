//! Image normalisation and persistence: `DynamicImage` → JPEG on disk.
//!
//! Extracted figures arrive in whatever pixel format the PDF embedded them
//! in, frequently RGBA with a transparent background. JPEG has no alpha
//! channel, so transparency is flattened onto white first — the page
//! background the figure was drawn against. Oversized figures are
//! downscaled to a width ceiling before encoding; diagram legibility
//! survives Lanczos resampling far better than the file-size cost of
//! shipping print-resolution scans.

use crate::error::ExtractError;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, RgbImage, Rgba};
use std::fs;
use std::path::Path;
use tracing::debug;

/// File name under the image directory for one saved figure:
/// `{day}_q{number:03}_{seq}.jpg`. Sequence numbers start at 1.
pub fn image_file_name(day_id: &str, number: u32, seq: usize) -> String {
    format!("{day_id}_q{number:03}_{seq}.jpg")
}

/// Flatten any alpha channel onto a white background.
fn flatten_onto_white(img: &DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }
    let rgba = img.to_rgba8();
    let mut flat = RgbImage::new(rgba.width(), rgba.height());
    for (x, y, &Rgba([r, g, b, a])) in rgba.enumerate_pixels() {
        let alpha = a as u32;
        let blend = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha)) / 255) as u8;
        flat.put_pixel(x, y, image::Rgb([blend(r), blend(g), blend(b)]));
    }
    flat
}

/// Normalise a figure for storage: flatten alpha, downscale to `max_width`.
pub fn prepare_image(img: &DynamicImage, max_width: u32) -> RgbImage {
    let flat = flatten_onto_white(img);
    if flat.width() <= max_width {
        return flat;
    }
    let scale = max_width as f32 / flat.width() as f32;
    let height = ((flat.height() as f32 * scale).round() as u32).max(1);
    debug!(
        from = flat.width(),
        to = max_width,
        "downscaling oversized figure"
    );
    image::imageops::resize(&flat, max_width, height, FilterType::Lanczos3)
}

/// Encode an already-normalised figure as JPEG at the given quality.
pub fn encode_jpeg(img: &RgbImage, quality: u8) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    img.write_with_encoder(encoder)?;
    Ok(buf)
}

/// Normalise and write one figure to `path`.
pub fn save_question_image(
    img: &DynamicImage,
    path: &Path,
    max_width: u32,
    quality: u8,
) -> Result<(), ExtractError> {
    let prepared = prepare_image(img, max_width);
    let bytes = encode_jpeg(&prepared, quality).map_err(|err| ExtractError::ImageWriteFailed {
        path: path.to_path_buf(),
        source: std::io::Error::other(err),
    })?;
    fs::write(path, &bytes).map_err(|err| ExtractError::ImageWriteFailed {
        path: path.to_path_buf(),
        source: err,
    })?;
    debug!(path = %path.display(), bytes = bytes.len(), "saved figure");
    Ok(())
}
