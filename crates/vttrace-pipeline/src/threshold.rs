//! Image decoding, grayscale conversion, and binary thresholding.
//!
//! Both extractors start the same way: decode the painted feature
//! image, reduce it to a single luminance channel, then apply a fixed
//! binary-inverse cut so "black ink" pixels become foreground (255)
//! and everything else becomes background (0).

use image::GrayImage;
use imageproc::contrast::{ThresholdType, threshold};

use crate::types::PipelineError;

/// Decode raw image bytes and convert to grayscale.
///
/// Supports whatever the `image` crate can decode (PNG, JPEG, BMP,
/// WebP). RGB-to-gray uses the standard luminance weighting.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is
/// unrecognized or the data is corrupt.
pub fn decode_grayscale(bytes: &[u8]) -> Result<GrayImage, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let img = image::load_from_memory(bytes)?;
    Ok(img.to_luma8())
}

/// Binary-inverse threshold: pixels at or below `cut` become 255
/// (foreground ink), pixels above it become 0.
///
/// The cut is a fixed constant per feature type, not adaptive; the
/// upstream image-edit service paints features at full black, so a
/// low fixed cut separates ink from background reliably.
#[must_use]
pub fn binarize_inverted(gray: &GrayImage, cut: u8) -> GrayImage {
    threshold(gray, cut, ThresholdType::BinaryInverted)
}
