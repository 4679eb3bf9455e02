//! Diagnostic overlay rendering.
//!
//! Draws the rescaled geometry back onto the original map image for
//! visual verification. Purely diagnostic: the UVTT assembler never
//! consumes this output.

use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point as IPoint;

use vttrace_pipeline::rescale::ScaledSegment;
use vttrace_pipeline::{Point, Polyline, ScaleFactors};

use crate::ExportError;

/// Wall palette, cycled by polyline index. The colors carry no
/// semantic grouping; adjacent contours just need to be told apart.
pub const WALL_PALETTE: [Rgba<u8>; 9] = [
    Rgba([255, 0, 0, 255]),
    Rgba([0, 255, 0, 255]),
    Rgba([0, 0, 255, 255]),
    Rgba([255, 255, 0, 255]),
    Rgba([255, 0, 255, 255]),
    Rgba([0, 255, 255, 255]),
    Rgba([128, 0, 0, 255]),
    Rgba([0, 128, 0, 255]),
    Rgba([0, 0, 128, 255]),
];

/// Fixed highlight color for portal segments.
pub const PORTAL_COLOR: Rgba<u8> = Rgba([0, 0, 255, 255]);

/// Line width in pixels for the given scale factors.
///
/// Thickness follows the smaller factor even when the resize was
/// non-square; see the pipeline's rescale module for why the min-based
/// behavior is kept.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn line_width(factors: ScaleFactors) -> i32 {
    ((2.0 * factors.uniform_min()) as i32).max(2)
}

/// Draw wall polylines and portal segments onto the original image.
///
/// Walls are drawn as closed loops (last point back to first when the
/// polyline has at least three points), cycling through
/// [`WALL_PALETTE`] by polyline order. Portals are drawn in
/// [`PORTAL_COLOR`]. All geometry must already be rescaled to the
/// original image's pixel space; the factors are used only for line
/// thickness.
#[must_use]
pub fn render_overlay(
    original: &DynamicImage,
    walls: &[Polyline],
    portals: &[ScaledSegment],
    factors: ScaleFactors,
) -> RgbaImage {
    let mut canvas = original.to_rgba8();
    let width = line_width(factors);

    for (idx, wall) in walls.iter().enumerate() {
        let color = WALL_PALETTE[idx % WALL_PALETTE.len()];
        let points = wall.points();
        if points.len() < 2 {
            continue;
        }
        for pair in points.windows(2) {
            draw_thick_line(&mut canvas, pair[0], pair[1], width, color);
        }
        if points.len() > 2 {
            draw_thick_line(&mut canvas, points[points.len() - 1], points[0], width, color);
        }
    }

    for segment in portals {
        // Overlay drawing truncates early; precision only matters for
        // document geometry.
        let (start, end) = segment.bounds();
        draw_thick_line(&mut canvas, start, end, width, PORTAL_COLOR);
    }

    canvas
}

/// Encode a rendered overlay as PNG bytes.
///
/// # Errors
///
/// Returns [`ExportError::ImageEncode`] if PNG encoding fails.
pub fn encode_png(overlay: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    let mut buf = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(overlay.clone()).write_to(&mut buf, image::ImageFormat::Png)?;
    Ok(buf.into_inner())
}

/// Draw one thick line segment as a filled quad.
#[allow(clippy::cast_possible_truncation)]
fn draw_thick_line(canvas: &mut RgbaImage, a: Point, b: Point, width: i32, color: Rgba<u8>) {
    if a == b {
        return;
    }

    let dx = f64::from(b.x - a.x);
    let dy = f64::from(b.y - a.y);
    let length = dx.hypot(dy);
    let half = f64::from(width) / 2.0;

    // Unit perpendicular, scaled to half the stroke width.
    let ox = (-dy / length * half).round() as i32;
    let oy = (dx / length * half).round() as i32;
    if ox == 0 && oy == 0 {
        imageproc::drawing::draw_line_segment_mut(
            canvas,
            (a.x as f32, a.y as f32),
            (b.x as f32, b.y as f32),
            color,
        );
        return;
    }

    let quad = [
        IPoint::new(a.x - ox, a.y - oy),
        IPoint::new(a.x + ox, a.y + oy),
        IPoint::new(b.x + ox, b.y + oy),
        IPoint::new(b.x - ox, b.y - oy),
    ];
    draw_polygon_mut(canvas, &quad, color);
}
