//! Wall segment extraction from a painted outline image.
//!
//! Input is an image where walls and impassable boundaries have been
//! painted as thick black lines. Output is one closed polyline per
//! retained boundary, in the outline image's own pixel space.

use image::GrayImage;

use crate::types::{DetectConfig, PipelineError, Polyline};
use crate::{contour, simplify, threshold};

/// Extract wall polylines from an already-binarized mask.
///
/// Pipeline: trace all borders (outer and hole), drop contours whose
/// enclosed area falls below the noise floor, then simplify each to a
/// reduced-vertex polygon with a tolerance proportional to its own
/// perimeter. Only polygons with at least three vertices survive.
#[must_use]
pub fn extract_walls_from_mask(mask: &GrayImage, config: &DetectConfig) -> Vec<Polyline> {
    contour::trace_all_contours(mask)
        .into_iter()
        .filter(|c| contour::contour_area(c) >= config.min_contour_area)
        .map(|c| {
            let epsilon = config.simplify_fraction * contour::closed_arc_length(&c);
            simplify::approximate_closed(&c, epsilon)
        })
        .filter(|p| p.len() >= 3)
        .collect()
}

/// Extract wall polylines from raw outline-image bytes.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] or
/// [`PipelineError::ImageDecode`] when the bytes cannot be decoded.
pub fn extract_walls(bytes: &[u8], config: &DetectConfig) -> Result<Vec<Polyline>, PipelineError> {
    let gray = threshold::decode_grayscale(bytes)?;
    let mask = threshold::binarize_inverted(&gray, config.wall_threshold);
    Ok(extract_walls_from_mask(&mask, config))
}
