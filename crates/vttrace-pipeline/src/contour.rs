//! Contour tracing and closed-polygon measurements.
//!
//! Wall ink forms filled regions in the binary mask; Suzuki-Abe border
//! following recovers every region boundary, outer and hole alike.
//! Hole borders are kept deliberately: the interior face of a wall
//! ring is real line-of-sight geometry, not hierarchy noise.

use image::GrayImage;

use crate::types::{Point, Polyline};

/// Trace all borders in a binary mask (nonzero = foreground).
///
/// Returns one polyline per border, outer and hole borders alike, in
/// the deterministic raster-scan order the tracer discovers them.
/// Borders with fewer than two points are dropped.
#[must_use]
pub fn trace_all_contours(mask: &GrayImage) -> Vec<Polyline> {
    let contours: Vec<imageproc::contours::Contour<i32>> =
        imageproc::contours::find_contours(mask);

    contours
        .into_iter()
        .filter(|c| c.points.len() >= 2)
        .map(|c| {
            let points = c.points.into_iter().map(|p| Point::new(p.x, p.y)).collect();
            Polyline::new(points)
        })
        .collect()
}

/// Enclosed area of a closed polyline via the shoelace formula.
///
/// Returns the absolute area in square pixels; orientation does not
/// matter. Polylines with fewer than three points enclose nothing.
#[must_use]
pub fn contour_area(polyline: &Polyline) -> f64 {
    let points = polyline.points();
    if points.len() < 3 {
        return 0.0;
    }

    let mut twice_area = 0i64;
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        twice_area += i64::from(a.x) * i64::from(b.y) - i64::from(b.x) * i64::from(a.y);
    }

    #[allow(clippy::cast_precision_loss)]
    let area = (twice_area.abs() as f64) / 2.0;
    area
}

/// Perimeter of a closed polyline, including the closing edge from
/// the last point back to the first.
#[must_use]
pub fn closed_arc_length(polyline: &Polyline) -> f64 {
    let points = polyline.points();
    if points.len() < 2 {
        return 0.0;
    }

    let mut length = 0.0;
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        length += a.distance(b);
    }
    length
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_polyline() -> Polyline {
        Polyline::new(vec![
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(10, 4),
            Point::new(0, 4),
        ])
    }

    #[test]
    fn empty_mask_produces_no_contours() {
        let mask = GrayImage::new(10, 10);
        assert!(trace_all_contours(&mask).is_empty());
    }

    #[test]
    fn filled_rectangle_produces_one_contour() {
        let mut mask = GrayImage::new(30, 30);
        for y in 5..15 {
            for x in 5..25 {
                mask.put_pixel(x, y, image::Luma([255]));
            }
        }
        let contours = trace_all_contours(&mask);
        assert_eq!(contours.len(), 1);
        assert!(contours[0].len() >= 4);
    }

    #[test]
    fn hollow_rectangle_produces_outer_and_hole_borders() {
        // A 3px-thick rectangular ring, like a painted wall loop.
        let mut mask = GrayImage::new(40, 40);
        for y in 5..35 {
            for x in 5..35 {
                let on_ring = !(8..32).contains(&x) || !(8..32).contains(&y);
                if on_ring {
                    mask.put_pixel(x, y, image::Luma([255]));
                }
            }
        }
        let contours = trace_all_contours(&mask);
        assert_eq!(
            contours.len(),
            2,
            "expected outer border plus interior hole border"
        );
    }

    #[test]
    fn rectangle_area_is_width_times_height() {
        assert!((contour_area(&rect_polyline()) - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn degenerate_polyline_has_zero_area() {
        let pl = Polyline::new(vec![Point::new(0, 0), Point::new(5, 5)]);
        assert!(contour_area(&pl).abs() < f64::EPSILON);
    }

    #[test]
    fn rectangle_perimeter_includes_closing_edge() {
        assert!((closed_arc_length(&rect_polyline()) - 28.0).abs() < f64::EPSILON);
    }

    #[test]
    fn traced_contours_are_deterministic() {
        let mut mask = GrayImage::new(20, 20);
        for y in 3..9 {
            for x in 3..17 {
                mask.put_pixel(x, y, image::Luma([255]));
            }
        }
        let first = trace_all_contours(&mask);
        let second = trace_all_contours(&mask);
        assert_eq!(first, second);
    }
}
