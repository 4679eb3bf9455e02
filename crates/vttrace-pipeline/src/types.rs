//! Shared types for the vttrace feature-extraction pipeline.

use serde::{Deserialize, Serialize};

/// Re-export the raster image types so downstream crates can reference
/// pipeline inputs/outputs without depending on `image` directly.
pub use image::{DynamicImage, GrayImage, RgbaImage};

/// A 2D point in integer pixel coordinates.
///
/// The coordinate space (resized-image vs. original-image pixels) is
/// not encoded in the type; every collection of points travels with
/// the [`Dimensions`] of the image it was measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (pixels from left edge).
    pub x: i32,
    /// Vertical position (pixels from top edge).
    pub y: i32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        dx.hypot(dy)
    }
}

/// An ordered sequence of points tracing a wall boundary.
///
/// A polyline with three or more points is implicitly closed: the last
/// point connects back to the first when rendered or exported. There
/// is no explicit open/closed flag beyond that convention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Polyline(Vec<Point>);

impl Polyline {
    /// Create a new polyline from a vector of points.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Returns `true` if the polyline has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of points in the polyline.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Consumes the polyline and returns the underlying vector of points.
    #[must_use]
    pub fn into_points(self) -> Vec<Point> {
        self.0
    }
}

/// A single detected portal: one straight line segment marking a
/// doorway or transition between two areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// First endpoint.
    pub start: Point,
    /// Second endpoint.
    pub end: Point,
}

impl Segment {
    /// Create a new segment.
    #[must_use]
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Length of the segment in pixels.
    #[must_use]
    pub fn length(self) -> f64 {
        self.start.distance(self.end)
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Width-over-height aspect ratio.
    #[must_use]
    pub fn aspect(self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

/// One of the fixed output resolutions accepted by the upstream
/// image-edit service.
///
/// Declaration order matters: aspect-ratio ties during bucket
/// selection resolve to the earliest variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SizeBucket {
    /// 1024x1024.
    Square,
    /// 1536x1024.
    Landscape,
    /// 1024x1536.
    Portrait,
}

impl SizeBucket {
    /// All buckets in declaration (tie-break) order.
    pub const ALL: [Self; 3] = [Self::Square, Self::Landscape, Self::Portrait];

    /// Exact output dimensions for this bucket.
    #[must_use]
    pub const fn dimensions(self) -> Dimensions {
        match self {
            Self::Square => Dimensions {
                width: 1024,
                height: 1024,
            },
            Self::Landscape => Dimensions {
                width: 1536,
                height: 1024,
            },
            Self::Portrait => Dimensions {
                width: 1024,
                height: 1536,
            },
        }
    }

    /// Nominal aspect ratio used for bucket selection.
    ///
    /// The portrait value is the literal `0.667` the upstream service
    /// publishes, not `1024/1536`; selection must match the service's
    /// own rounding.
    #[must_use]
    pub const fn aspect(self) -> f64 {
        match self {
            Self::Square => 1.0,
            Self::Landscape => 1.5,
            Self::Portrait => 0.667,
        }
    }

    /// Human-readable bucket name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Square => "square",
            Self::Landscape => "landscape",
            Self::Portrait => "portrait",
        }
    }
}

impl std::fmt::Display for SizeBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let d = self.dimensions();
        write!(f, "{} ({}x{})", self.label(), d.width, d.height)
    }
}

/// Fixed parameters for the probabilistic Hough line detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoughParams {
    /// Distance resolution of the accumulator in pixels.
    pub rho: f64,
    /// Angular resolution of the accumulator in radians.
    pub theta_step: f64,
    /// Minimum accumulator votes before a candidate line is walked.
    pub vote_threshold: u32,
    /// Minimum segment length in pixels; shorter detections are dropped.
    pub min_line_length: f64,
    /// Maximum gap in pixels allowed between points on the same line.
    pub max_line_gap: f64,
}

impl Default for HoughParams {
    fn default() -> Self {
        Self {
            rho: 1.0,
            theta_step: std::f64::consts::PI / 180.0,
            vote_threshold: 50,
            min_line_length: 20.0,
            max_line_gap: 5.0,
        }
    }
}

/// Configuration for the feature-extraction pipeline.
///
/// Thresholds are fixed constants tuned against the upstream
/// image-edit service's output style ("thick black lines on a light
/// background"), not derived or adaptive values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectConfig {
    /// Binary-inverse intensity cut for the wall outline image.
    /// Pixels at or below this value become foreground ink.
    pub wall_threshold: u8,

    /// Binary-inverse intensity cut for the portal highlight image.
    /// Tuned independently of `wall_threshold`.
    pub portal_threshold: u8,

    /// Contours with enclosed area below this value (square pixels)
    /// are discarded as anti-aliasing noise.
    pub min_contour_area: f64,

    /// Polygon simplification tolerance as a fraction of each
    /// contour's own closed arc length.
    pub simplify_fraction: f64,

    /// Portal line detector parameters.
    pub hough: HoughParams,
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            wall_threshold: 25,
            portal_threshold: 50,
            min_contour_area: 30.0,
            simplify_fraction: 0.005,
            hough: HoughParams::default(),
        }
    }
}

/// Errors that can occur in the feature-extraction pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// A rescale source size had a zero dimension. This is a
    /// programming-contract violation, not a recoverable condition.
    #[error("rescale source has a zero dimension: {width}x{height}")]
    ZeroDimension {
        /// Offending source width.
        width: u32,
        /// Offending source height.
        height: u32,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn point_distance() {
        let a = Point::new(0, 0);
        let b = Point::new(3, 4);
        assert!((a.distance(b) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn segment_length() {
        let s = Segment::new(Point::new(10, 10), Point::new(10, 22));
        assert!((s.length() - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn polyline_accessors() {
        let pl = Polyline::new(vec![Point::new(0, 0), Point::new(1, 1)]);
        assert_eq!(pl.len(), 2);
        assert!(!pl.is_empty());
        assert_eq!(pl.points()[1], Point::new(1, 1));
        assert_eq!(pl.into_points().len(), 2);
    }

    #[test]
    fn dimensions_aspect() {
        let d = Dimensions {
            width: 1536,
            height: 1024,
        };
        assert!((d.aspect() - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn bucket_dimensions_match_service_sizes() {
        assert_eq!(
            SizeBucket::Square.dimensions(),
            Dimensions {
                width: 1024,
                height: 1024
            }
        );
        assert_eq!(
            SizeBucket::Landscape.dimensions(),
            Dimensions {
                width: 1536,
                height: 1024
            }
        );
        assert_eq!(
            SizeBucket::Portrait.dimensions(),
            Dimensions {
                width: 1024,
                height: 1536
            }
        );
    }

    #[test]
    fn bucket_display_includes_label_and_size() {
        assert_eq!(SizeBucket::Landscape.to_string(), "landscape (1536x1024)");
    }

    #[test]
    fn detect_config_defaults() {
        let config = DetectConfig::default();
        assert_eq!(config.wall_threshold, 25);
        assert_eq!(config.portal_threshold, 50);
        assert!((config.min_contour_area - 30.0).abs() < f64::EPSILON);
        assert!((config.simplify_fraction - 0.005).abs() < f64::EPSILON);
        assert_eq!(config.hough.vote_threshold, 50);
        assert!((config.hough.min_line_length - 20.0).abs() < f64::EPSILON);
        assert!((config.hough.max_line_gap - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn point_serializes_as_xy_object() {
        let json = serde_json::to_string(&Point::new(3, 7)).unwrap();
        assert_eq!(json, r#"{"x":3,"y":7}"#);
    }

    #[test]
    fn config_serde_round_trip() {
        let config = DetectConfig {
            wall_threshold: 40,
            ..DetectConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: DetectConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn error_display() {
        let err = PipelineError::ZeroDimension {
            width: 0,
            height: 40,
        };
        assert_eq!(err.to_string(), "rescale source has a zero dimension: 0x40");
        assert_eq!(
            PipelineError::EmptyInput.to_string(),
            "input image data is empty"
        );
    }
}
