//! Coordinate rescaling between image resolutions.
//!
//! Features are detected in resized-bucket space but exported in
//! original-image pixel space. The mapping uses independent X and Y
//! factors since bucket resizing does not preserve aspect ratio.
//!
//! Two precisions coexist on purpose. Wall polylines and anything
//! destined for drawing truncate to integers immediately. Portal
//! segments keep unrounded floating endpoints through to document
//! assembly, so midpoint and rotation are computed before any cast
//! and do not accumulate per-endpoint rounding error.

use serde::{Deserialize, Serialize};

use crate::types::{Dimensions, PipelineError, Point, Polyline, Segment};

/// Independent X/Y scale factors between two pixel coordinate spaces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleFactors {
    /// Horizontal factor (`to.width / from.width`).
    pub x: f64,
    /// Vertical factor (`to.height / from.height`).
    pub y: f64,
}

impl ScaleFactors {
    /// Compute the factors mapping `from`-space coordinates into
    /// `to`-space coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ZeroDimension`] when `from` has a zero
    /// dimension. That is a contract violation by the caller and is
    /// never retried.
    pub fn between(from: Dimensions, to: Dimensions) -> Result<Self, PipelineError> {
        if from.width == 0 || from.height == 0 {
            return Err(PipelineError::ZeroDimension {
                width: from.width,
                height: from.height,
            });
        }
        Ok(Self {
            x: f64::from(to.width) / f64::from(from.width),
            y: f64::from(to.height) / f64::from(from.height),
        })
    }

    /// The smaller of the two factors.
    ///
    /// Overlay line thickness derives from this even when the factors
    /// differ; directional thickness under non-square resize is an
    /// unresolved upstream question, so the min-based behavior stands.
    #[must_use]
    pub fn uniform_min(self) -> f64 {
        self.x.min(self.y)
    }
}

/// A point carried at floating precision after rescaling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloatPoint {
    /// Horizontal position in pixels.
    pub x: f64,
    /// Vertical position in pixels.
    pub y: f64,
}

/// A portal segment rescaled at floating precision.
///
/// Geometry derived from this (midpoint, rotation) must come from the
/// float endpoints; [`bounds`](Self::bounds) is the only place the
/// final integer cast happens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaledSegment {
    /// First endpoint.
    pub start: FloatPoint,
    /// Second endpoint.
    pub end: FloatPoint,
}

impl ScaledSegment {
    /// Arithmetic midpoint of the endpoints.
    #[must_use]
    pub fn midpoint(self) -> FloatPoint {
        FloatPoint {
            x: (self.start.x + self.end.x) / 2.0,
            y: (self.start.y + self.end.y) / 2.0,
        }
    }

    /// Rotation of the segment vector in radians (`atan2(dy, dx)`).
    #[must_use]
    pub fn rotation(self) -> f64 {
        (self.end.y - self.start.y).atan2(self.end.x - self.start.x)
    }

    /// Integer endpoints, truncated toward zero.
    #[must_use]
    pub fn bounds(self) -> (Point, Point) {
        (truncate(self.start), truncate(self.end))
    }
}

#[allow(clippy::cast_possible_truncation)]
fn truncate(p: FloatPoint) -> Point {
    Point::new(p.x as i32, p.y as i32)
}

/// Rescale a point, truncating toward zero.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn rescale_point(p: Point, factors: ScaleFactors) -> Point {
    Point::new(
        (f64::from(p.x) * factors.x) as i32,
        (f64::from(p.y) * factors.y) as i32,
    )
}

/// Rescale every point of a polyline, truncating toward zero.
#[must_use]
pub fn rescale_polyline(polyline: &Polyline, factors: ScaleFactors) -> Polyline {
    Polyline::new(
        polyline
            .points()
            .iter()
            .map(|&p| rescale_point(p, factors))
            .collect(),
    )
}

/// Rescale a set of wall polylines.
#[must_use]
pub fn rescale_polylines(polylines: &[Polyline], factors: ScaleFactors) -> Vec<Polyline> {
    polylines
        .iter()
        .map(|pl| rescale_polyline(pl, factors))
        .collect()
}

/// Rescale a portal segment, keeping floating precision.
#[must_use]
pub fn rescale_segment(segment: Segment, factors: ScaleFactors) -> ScaledSegment {
    ScaledSegment {
        start: FloatPoint {
            x: f64::from(segment.start.x) * factors.x,
            y: f64::from(segment.start.y) * factors.y,
        },
        end: FloatPoint {
            x: f64::from(segment.end.x) * factors.x,
            y: f64::from(segment.end.y) * factors.y,
        },
    }
}

/// Rescale a set of portal segments.
#[must_use]
pub fn rescale_segments(segments: &[Segment], factors: ScaleFactors) -> Vec<ScaledSegment> {
    segments
        .iter()
        .map(|&s| rescale_segment(s, factors))
        .collect()
}
