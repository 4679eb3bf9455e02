//! Closed-polygon simplification (Ramer-Douglas-Peucker).
//!
//! Traced borders follow every boundary pixel; simplification reduces
//! them to their corner vertices. The tolerance is proportional to
//! each contour's own perimeter rather than a global pixel value, so
//! large and small wall loops simplify to comparable vertex budgets.

use crate::types::{Point, Polyline};

/// Simplify a closed polyline to a reduced-vertex polygon.
///
/// The ring is cut at its first point, walked once around (the first
/// point repeated at the end as the closing anchor), and run through
/// Douglas-Peucker with the given tolerance in pixels. Polylines with
/// fewer than three points are returned unchanged.
#[must_use = "returns the simplified polygon"]
pub fn approximate_closed(polyline: &Polyline, tolerance: f64) -> Polyline {
    let points = polyline.points();
    if points.len() < 3 {
        return polyline.clone();
    }

    // Open the ring: duplicate the first point as the final anchor.
    let mut ring: Vec<Point> = Vec::with_capacity(points.len() + 1);
    ring.extend_from_slice(points);
    ring.push(points[0]);

    let mut kept = vec![false; ring.len()];
    kept[0] = true;
    kept[ring.len() - 1] = true;

    rdp_recurse(&ring, 0, ring.len() - 1, tolerance, &mut kept);

    let mut simplified: Vec<Point> = ring
        .iter()
        .zip(&kept)
        .filter(|&(_, k)| *k)
        .map(|(&p, _)| p)
        .collect();

    // Drop the duplicated closing anchor.
    simplified.pop();
    Polyline::new(simplified)
}

/// Recursive step of the Ramer-Douglas-Peucker algorithm.
///
/// Finds the point between `start` and `end` that is farthest from the
/// chord between them. If that distance exceeds `tolerance`, the point
/// is kept and both sub-chains are processed recursively.
fn rdp_recurse(points: &[Point], start: usize, end: usize, tolerance: f64, kept: &mut [bool]) {
    if end <= start + 1 {
        return;
    }

    let mut max_dist = 0.0;
    let mut max_idx = start;

    for i in (start + 1)..end {
        let d = perpendicular_distance(points[i], points[start], points[end]);
        if d > max_dist {
            max_dist = d;
            max_idx = i;
        }
    }

    if max_dist > tolerance {
        kept[max_idx] = true;
        rdp_recurse(points, start, max_idx, tolerance, kept);
        rdp_recurse(points, max_idx, end, tolerance, kept);
    }
}

/// Perpendicular distance from point `p` to the line through `a` and `b`.
///
/// Uses |cross(b-a, p-a)| / |b-a|. When `a` and `b` coincide (the ring
/// anchor case, where both chord ends are the same vertex), this
/// degrades to the point-to-point distance, which is exactly the
/// "farthest from the anchor" split the closed form needs.
fn perpendicular_distance(p: Point, a: Point, b: Point) -> f64 {
    let dx = f64::from(b.x - a.x);
    let dy = f64::from(b.y - a.y);
    let length_sq = dx.mul_add(dx, dy * dy);

    if length_sq == 0.0 {
        return p.distance(a);
    }

    let cross = dx.mul_add(f64::from(a.y - p.y), -(dy * f64::from(a.x - p.x)));
    cross.abs() / length_sq.sqrt()
}
