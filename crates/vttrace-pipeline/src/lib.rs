//! vttrace-pipeline: Pure map feature-extraction pipeline (sans-IO).
//!
//! Converts painted feature images into vector geometry:
//!
//! - wall outline image -> binary threshold -> contour tracing ->
//!   closed-polygon simplification -> wall polylines
//! - portal highlight image -> binary threshold -> probabilistic
//!   Hough transform -> portal segments
//!
//! plus the resize/rescale machinery that moves geometry between the
//! original image's pixel space and the fixed resolution buckets the
//! upstream image-edit service requires.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! byte slices and returns structured data. Orchestration, external
//! services, and artifact storage live in `vttrace-flow`.

pub mod contour;
pub mod hough;
pub mod portals;
pub mod rescale;
pub mod resize;
pub mod simplify;
pub mod threshold;
pub mod types;
pub mod walls;

pub use portals::extract_portals;
pub use rescale::{FloatPoint, ScaleFactors, ScaledSegment};
pub use resize::{resize, select_bucket};
pub use types::{
    DetectConfig, Dimensions, HoughParams, PipelineError, Point, Polyline, Segment, SizeBucket,
};
pub use walls::extract_walls;

/// Walls and portals extracted from one pair of painted images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSet {
    /// Wall polylines, in detected-image pixel space.
    pub walls: Vec<Polyline>,
    /// Portal segments, in detected-image pixel space.
    pub portals: Vec<Segment>,
    /// Pixel space the features were detected in (the wall outline
    /// image's dimensions).
    pub dimensions: Dimensions,
}

/// Run both extractors over a pair of painted feature images.
///
/// The two inputs come from independent image-edit calls over the same
/// resized map, so they share a pixel space; the extractors themselves
/// are mutually independent and carry no ordering semantics.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] or
/// [`PipelineError::ImageDecode`] when either image cannot be decoded.
pub fn detect_features(
    wall_outline: &[u8],
    portal_highlight: &[u8],
    config: &DetectConfig,
) -> Result<FeatureSet, PipelineError> {
    let wall_gray = threshold::decode_grayscale(wall_outline)?;
    let dimensions = Dimensions {
        width: wall_gray.width(),
        height: wall_gray.height(),
    };

    let wall_mask = threshold::binarize_inverted(&wall_gray, config.wall_threshold);
    let walls = walls::extract_walls_from_mask(&wall_mask, config);

    let portals = portals::extract_portals(portal_highlight, config)?;

    Ok(FeatureSet {
        walls,
        portals,
        dimensions,
    })
}
