//! Portal segment extraction from a painted highlight image.
//!
//! Input is an image where doorways and passages have been painted as
//! short straight black strokes. Output is one line segment per
//! detected stroke, in the highlight image's own pixel space. No
//! segments is a valid result: many maps simply have no portals.

use image::GrayImage;

use crate::types::{DetectConfig, PipelineError, Segment};
use crate::{hough, threshold};

/// Extract portal segments from an already-binarized mask.
#[must_use]
pub fn extract_portals_from_mask(mask: &GrayImage, config: &DetectConfig) -> Vec<Segment> {
    hough::detect_segments(mask, &config.hough)
}

/// Extract portal segments from raw highlight-image bytes.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] or
/// [`PipelineError::ImageDecode`] when the bytes cannot be decoded.
pub fn extract_portals(
    bytes: &[u8],
    config: &DetectConfig,
) -> Result<Vec<Segment>, PipelineError> {
    let gray = threshold::decode_grayscale(bytes)?;
    let mask = threshold::binarize_inverted(&gray, config.portal_threshold);
    Ok(extract_portals_from_mask(&mask, config))
}
