//! Probabilistic Hough transform for straight line-segment detection.
//!
//! Portal marks are short, isolated straight strokes, so a full-line
//! Hough transform is the wrong shape: it reports infinite lines, not
//! the stroke endpoints. This is the progressive probabilistic
//! variant: pixels vote into a (rho, theta) accumulator one at a time,
//! and as soon as a bin clears the vote threshold the detector walks
//! the binary mask along that line to find the actual segment extent,
//! then retires the segment's pixels so they cannot vote again.
//!
//! Unlike the classical formulation, seeds are consumed in row-major
//! raster order rather than at random. Detection quality is the same
//! on mask-style input, and the output becomes a pure function of the
//! pixel buffer, which the pipeline contract requires.

use image::GrayImage;

use crate::types::{HoughParams, Point, Segment};

/// Precomputed (sin, cos) per accumulator angle.
struct TrigTable {
    entries: Vec<(f64, f64)>,
}

impl TrigTable {
    fn new(theta_step: f64) -> Self {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let bins = (std::f64::consts::PI / theta_step).round().max(1.0) as usize;
        let entries = (0..bins)
            .map(|t| {
                #[allow(clippy::cast_precision_loss)]
                let angle = t as f64 * theta_step;
                angle.sin_cos()
            })
            .collect();
        Self { entries }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Accumulator and pixel bookkeeping for one detection run.
struct Accumulator {
    votes: Vec<i32>,
    rho_bins: usize,
    rho_offset: i32,
    inv_rho: f64,
}

impl Accumulator {
    fn new(width: u32, height: u32, trig: &TrigTable, rho: f64) -> Self {
        let diagonal = f64::from(width).hypot(f64::from(height));
        #[allow(clippy::cast_possible_truncation)]
        let rho_offset = (diagonal / rho).ceil() as i32;
        #[allow(clippy::cast_sign_loss)]
        let rho_bins = (2 * rho_offset + 1) as usize;
        Self {
            votes: vec![0; rho_bins * trig.len()],
            rho_bins,
            rho_offset,
            inv_rho: 1.0 / rho,
        }
    }

    fn bin_index(&self, x: i32, y: i32, theta: usize, trig: &TrigTable) -> usize {
        let (sin_t, cos_t) = trig.entries[theta];
        let rho = f64::from(x).mul_add(cos_t, f64::from(y) * sin_t) * self.inv_rho;
        #[allow(clippy::cast_possible_truncation)]
        let bin = rho.round() as i32 + self.rho_offset;
        #[allow(clippy::cast_sign_loss)]
        let bin = bin.clamp(0, self.rho_bins as i32 - 1) as usize;
        theta * self.rho_bins + bin
    }

    /// Add one pixel's votes across all angles; returns the angle bin
    /// holding the most votes afterwards (earliest angle wins ties)
    /// and that bin's count.
    fn vote(&mut self, x: i32, y: i32, trig: &TrigTable) -> (usize, i32) {
        let mut best_theta = 0;
        let mut best_votes = 0;
        for theta in 0..trig.len() {
            let idx = self.bin_index(x, y, theta, trig);
            self.votes[idx] += 1;
            if self.votes[idx] > best_votes {
                best_votes = self.votes[idx];
                best_theta = theta;
            }
        }
        (best_theta, best_votes)
    }

    /// Remove a previously-voted pixel's votes across all angles.
    fn unvote(&mut self, x: i32, y: i32, trig: &TrigTable) {
        for theta in 0..trig.len() {
            let idx = self.bin_index(x, y, theta, trig);
            self.votes[idx] -= 1;
        }
    }
}

/// Remaining foreground pixels plus per-pixel voted flags.
struct PixelMask {
    width: i32,
    height: i32,
    foreground: Vec<bool>,
    voted: Vec<bool>,
}

impl PixelMask {
    fn new(mask: &GrayImage) -> Self {
        #[allow(clippy::cast_possible_wrap)]
        let (width, height) = (mask.width() as i32, mask.height() as i32);
        #[allow(clippy::cast_sign_loss)]
        let len = (width * height) as usize;
        let mut foreground = vec![false; len];
        for (x, y, pixel) in mask.enumerate_pixels() {
            if pixel.0[0] > 0 {
                #[allow(clippy::cast_possible_wrap)]
                let idx = (y * mask.width() + x) as usize;
                foreground[idx] = true;
            }
        }
        Self {
            width,
            height,
            foreground,
            voted: vec![false; len],
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        #[allow(clippy::cast_sign_loss)]
        let idx = (y * self.width + x) as usize;
        Some(idx)
    }

    fn is_foreground(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some_and(|i| self.foreground[i])
    }
}

/// Detect line segments in a binary mask (nonzero = foreground).
///
/// Each returned [`Segment`] spans the gap-tolerant extent of one
/// detected line; nearby or collinear detections are not merged.
/// An empty result is a valid outcome, not an error.
#[must_use]
pub fn detect_segments(mask: &GrayImage, params: &HoughParams) -> Vec<Segment> {
    if mask.width() == 0 || mask.height() == 0 {
        return Vec::new();
    }

    let trig = TrigTable::new(params.theta_step);
    let mut acc = Accumulator::new(mask.width(), mask.height(), &trig, params.rho);
    let mut pixels = PixelMask::new(mask);

    #[allow(clippy::cast_possible_truncation)]
    let vote_threshold = params.vote_threshold as i32;
    let mut segments = Vec::new();

    // Seeds are consumed in raster order for determinism.
    for y in 0..pixels.height {
        for x in 0..pixels.width {
            let Some(idx) = pixels.index(x, y) else {
                continue;
            };
            if !pixels.foreground[idx] {
                continue;
            }

            let (theta, votes) = acc.vote(x, y, &trig);
            pixels.voted[idx] = true;
            if votes < vote_threshold {
                continue;
            }

            let (sin_t, cos_t) = trig.entries[theta];
            // Direction along the line (perpendicular to the normal).
            let (dx, dy) = (-sin_t, cos_t);

            let forward = walk_line(&pixels, x, y, dx, dy, params.max_line_gap);
            let backward = walk_line(&pixels, x, y, -dx, -dy, params.max_line_gap);

            let segment = Segment::new(backward.end, forward.end);
            if segment.length() < params.min_line_length {
                continue;
            }

            // Retire the segment's pixels so they cannot seed or
            // support further detections.
            for p in backward.on_line.iter().chain(&forward.on_line) {
                if let Some(i) = pixels.index(p.x, p.y) {
                    if pixels.foreground[i] {
                        pixels.foreground[i] = false;
                        if pixels.voted[i] {
                            pixels.voted[i] = false;
                            acc.unvote(p.x, p.y, &trig);
                        }
                    }
                }
            }

            segments.push(segment);
        }
    }

    segments
}

/// Result of walking the mask from a seed along one direction.
struct Walk {
    /// Last foreground pixel reached before the gap budget ran out.
    end: Point,
    /// Every foreground pixel touched along the way (seed included
    /// when walking forward from it).
    on_line: Vec<Point>,
}

/// March from `(x0, y0)` in unit steps of `(dx, dy)`, tolerating up to
/// `max_gap` consecutive background pixels before stopping.
fn walk_line(pixels: &PixelMask, x0: i32, y0: i32, dx: f64, dy: f64, max_gap: f64) -> Walk {
    let mut end = Point::new(x0, y0);
    let mut on_line = vec![end];
    let mut gap = 0.0;
    let mut step: f64 = 1.0;

    loop {
        #[allow(clippy::cast_possible_truncation)]
        let x = step.mul_add(dx, f64::from(x0)).round() as i32;
        #[allow(clippy::cast_possible_truncation)]
        let y = step.mul_add(dy, f64::from(y0)).round() as i32;

        if pixels.index(x, y).is_none() {
            break;
        }
        if pixels.is_foreground(x, y) {
            end = Point::new(x, y);
            on_line.push(end);
            gap = 0.0;
        } else {
            gap += 1.0;
            if gap > max_gap {
                break;
            }
        }
        step += 1.0;
    }

    Walk { end, on_line }
}
