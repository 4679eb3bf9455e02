//! Universal VTT document assembly.
//!
//! Builds the portable interchange document consumed by virtual
//! tabletops: grid-unit map size, line-of-sight wall polylines,
//! portal objects, environment defaults, and the source map embedded
//! as base64 PNG. All geometry entering this module must already be
//! in original-image pixel space.

use std::io::Cursor;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

use vttrace_pipeline::rescale::ScaledSegment;
use vttrace_pipeline::{Point, Polyline};

use crate::ExportError;

/// Fixed UVTT format version tag.
pub const FORMAT_VERSION: f64 = 1.0;

/// Default `software` tag.
pub const SOFTWARE_TAG: &str = "vttrace";

/// Default `creator` tag.
pub const CREATOR_TAG: &str = "vttrace feature detection";

/// Default grid scale in pixels per grid square.
pub const DEFAULT_PIXELS_PER_GRID: u32 = 70;

/// A point measured in floating units (grid squares or float pixels).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloatCoord {
    /// Horizontal component.
    pub x: f64,
    /// Vertical component.
    pub y: f64,
}

/// Grid resolution block of the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    /// Map origin; always `(0, 0)`.
    pub map_origin: FloatCoord,
    /// Map size in grid units (original pixels / `pixels_per_grid`,
    /// unrounded).
    pub map_size: FloatCoord,
    /// Grid scale in pixels per grid square.
    pub pixels_per_grid: u32,
}

/// A door or passage between two areas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portal {
    /// Midpoint of the portal segment, in float pixels.
    pub position: FloatCoord,
    /// The two segment endpoints, in integer pixels.
    pub bounds: [Point; 2],
    /// Angle of the segment vector in radians.
    pub rotation: f64,
    /// Whether the door starts closed. Always `false`: no detection
    /// signal drives this yet.
    pub closed: bool,
    /// Whether the portal is detached from a wall. Always `false`.
    pub freestanding: bool,
}

/// Lighting environment defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    /// Whether lighting is pre-baked into the map image.
    pub baked_lighting: bool,
    /// Ambient light color as a hex string.
    pub ambient_light: String,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            baked_lighting: false,
            ambient_light: "#ffffff".to_owned(),
        }
    }
}

/// A complete Universal VTT document.
///
/// Field order and names match the interchange format exactly; the
/// document is self-contained (geometry plus embedded image).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UvttDocument {
    /// Format version tag.
    pub format: f64,
    /// Grid resolution block.
    pub resolution: Resolution,
    /// Wall polylines in absolute original-image pixels. Each inner
    /// list is implicitly closed.
    pub line_of_sight: Vec<Vec<Point>>,
    /// Detected portals.
    pub portals: Vec<Portal>,
    /// Lighting defaults.
    pub environment: Environment,
    /// Base64-encoded PNG of the original map image.
    pub image: String,
    /// Producing software tag.
    pub software: String,
    /// Creator tag.
    pub creator: String,
}

impl UvttDocument {
    /// Serialize the document to JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Json`] if serialization fails.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, ExportError> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Assemble a UVTT document from rescaled geometry and the original
/// map image.
///
/// `walls` and `portals` must be in original-image pixel space.
/// Portal position and rotation are derived from the segments' float
/// endpoints; only `bounds` takes the integer cast.
///
/// # Errors
///
/// Returns [`ExportError::ImageEncode`] if the original image cannot
/// be re-encoded as PNG.
pub fn assemble(
    walls: &[Polyline],
    portals: &[ScaledSegment],
    original: &DynamicImage,
    pixels_per_grid: u32,
) -> Result<UvttDocument, ExportError> {
    let grid = f64::from(pixels_per_grid);
    let map_size = FloatCoord {
        x: f64::from(original.width()) / grid,
        y: f64::from(original.height()) / grid,
    };

    let line_of_sight = walls.iter().map(|pl| pl.points().to_vec()).collect();

    let portals = portals
        .iter()
        .map(|&segment| {
            let mid = segment.midpoint();
            let (start, end) = segment.bounds();
            Portal {
                position: FloatCoord { x: mid.x, y: mid.y },
                bounds: [start, end],
                rotation: segment.rotation(),
                closed: false,
                freestanding: false,
            }
        })
        .collect();

    Ok(UvttDocument {
        format: FORMAT_VERSION,
        resolution: Resolution {
            map_origin: FloatCoord { x: 0.0, y: 0.0 },
            map_size,
            pixels_per_grid,
        },
        line_of_sight,
        portals,
        environment: Environment::default(),
        image: encode_image_base64(original)?,
        software: SOFTWARE_TAG.to_owned(),
        creator: CREATOR_TAG.to_owned(),
    })
}

/// Re-encode an image as lossless PNG and base64 it.
fn encode_image_base64(image: &DynamicImage) -> Result<String, ExportError> {
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, image::ImageFormat::Png)?;
    Ok(BASE64.encode(buf.into_inner()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use vttrace_pipeline::rescale::ScaledSegment;
    use vttrace_pipeline::{ScaleFactors, Segment, rescale};

    fn test_image(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
            w,
            h,
            image::Rgba([90, 120, 30, 255]),
        ))
    }

    fn unit_segment(x0: i32, y0: i32, x1: i32, y1: i32) -> ScaledSegment {
        rescale::rescale_segment(
            Segment::new(
                vttrace_pipeline::Point::new(x0, y0),
                vttrace_pipeline::Point::new(x1, y1),
            ),
            ScaleFactors { x: 1.0, y: 1.0 },
        )
    }

    #[test]
    fn map_size_is_pixels_over_grid() {
        let doc = assemble(&[], &[], &test_image(512, 768), 70).unwrap();
        assert!((doc.resolution.map_size.x * 70.0 - 512.0).abs() < 1e-9);
        assert!((doc.resolution.map_size.y * 70.0 - 768.0).abs() < 1e-9);
        assert_eq!(doc.resolution.pixels_per_grid, 70);
        assert!((doc.resolution.map_origin.x).abs() < f64::EPSILON);
    }

    #[test]
    fn horizontal_portal_has_zero_rotation_and_midpoint_position() {
        let doc = assemble(
            &[],
            &[unit_segment(100, 100, 140, 100)],
            &test_image(256, 256),
            70,
        )
        .unwrap();

        let portal = &doc.portals[0];
        assert!((portal.position.x - 120.0).abs() < f64::EPSILON);
        assert!((portal.position.y - 100.0).abs() < f64::EPSILON);
        assert!(portal.rotation.abs() < f64::EPSILON);
        assert_eq!(portal.bounds[0], Point::new(100, 100));
        assert_eq!(portal.bounds[1], Point::new(140, 100));
        assert!(!portal.closed);
        assert!(!portal.freestanding);
    }

    #[test]
    fn no_portals_yields_empty_list_not_error() {
        let doc = assemble(&[], &[], &test_image(64, 64), 70).unwrap();
        assert!(doc.portals.is_empty());

        let json: serde_json::Value =
            serde_json::from_slice(&doc.to_json_bytes().unwrap()).unwrap();
        assert_eq!(json["portals"], serde_json::json!([]));
    }

    #[test]
    fn walls_pass_through_unchanged() {
        let wall = Polyline::new(vec![
            Point::new(10, 10),
            Point::new(50, 10),
            Point::new(50, 40),
        ]);
        let doc = assemble(&[wall.clone()], &[], &test_image(64, 64), 70).unwrap();
        assert_eq!(doc.line_of_sight, vec![wall.into_points()]);
    }

    #[test]
    fn document_json_shape_matches_interchange_format() {
        let doc = assemble(
            &[Polyline::new(vec![
                Point::new(0, 0),
                Point::new(10, 0),
                Point::new(10, 10),
            ])],
            &[unit_segment(4, 8, 4, 20)],
            &test_image(140, 70),
            70,
        )
        .unwrap();

        let json: serde_json::Value =
            serde_json::from_slice(&doc.to_json_bytes().unwrap()).unwrap();

        assert_eq!(json["format"], serde_json::json!(1.0));
        assert_eq!(json["resolution"]["map_origin"]["x"], 0.0);
        assert_eq!(json["resolution"]["map_size"]["x"], 2.0);
        assert_eq!(json["resolution"]["map_size"]["y"], 1.0);
        assert_eq!(json["resolution"]["pixels_per_grid"], 70);
        assert_eq!(json["line_of_sight"][0][1], serde_json::json!({"x": 10, "y": 0}));
        assert_eq!(json["portals"][0]["closed"], false);
        assert_eq!(json["portals"][0]["freestanding"], false);
        assert_eq!(json["portals"][0]["bounds"][0], serde_json::json!({"x": 4, "y": 8}));
        assert_eq!(json["environment"]["baked_lighting"], false);
        assert_eq!(json["environment"]["ambient_light"], "#ffffff");
        assert_eq!(json["software"], SOFTWARE_TAG);
        assert_eq!(json["creator"], CREATOR_TAG);
        assert!(json["image"].as_str().is_some_and(|s| !s.is_empty()));
    }

    #[test]
    fn embedded_image_is_valid_base64_png() {
        let doc = assemble(&[], &[], &test_image(20, 30), 70).unwrap();
        let bytes = BASE64.decode(doc.image).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), 20);
        assert_eq!(decoded.height(), 30);
    }

    #[test]
    fn vertical_portal_rotation_is_half_pi() {
        let doc = assemble(
            &[],
            &[unit_segment(50, 10, 50, 90)],
            &test_image(128, 128),
            70,
        )
        .unwrap();
        assert!((doc.portals[0].rotation - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn document_serde_round_trip() {
        let doc = assemble(
            &[Polyline::new(vec![
                Point::new(1, 2),
                Point::new(3, 4),
                Point::new(5, 6),
            ])],
            &[unit_segment(10, 10, 40, 10)],
            &test_image(64, 64),
            50,
        )
        .unwrap();
        let json = doc.to_json_bytes().unwrap();
        let back: UvttDocument = serde_json::from_slice(&json).unwrap();
        assert_eq!(back, doc);
    }
}
