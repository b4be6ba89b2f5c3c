//! Straight line extraction from edge masks.
//!
//! - [`find_lines`] traces an [`EdgeMask`] into raw pixel chains.
//! - [`fit_line`] and [`filter_lines`] turn chains into near-vertical
//!   [`FittedLine`] candidates.
//! - [`control_points_along`] spreads line control points along a chain.
mod filter;
mod fit;
mod trace;
mod types;

pub use filter::{filter_lines, FilterParams};
pub use fit::{fit_line, footpoint, FittedLine};
pub use trace::trace_lines;
pub use types::{LineStatus, RawLine, TraceOptions};

use crate::edges::EdgeMask;
use crate::panorama::{ControlPoint, CpMode};
use log::debug;
use std::time::Instant;

/// Focal length in pixels of a `width × height` image.
///
/// `pixels_per_mm` is `crop/24 · min(w, h)` for crop factors above 1 and
/// `24/crop · min(w, h)` otherwise.
pub fn focal_length_pixels(focal_mm: f64, crop_factor: f64, width: usize, height: usize) -> f64 {
    let min_side = width.min(height) as f64;
    let pixels_per_mm = if crop_factor > 1.0 {
        crop_factor / 24.0 * min_side
    } else {
        24.0 / crop_factor * min_side
    };
    focal_mm * pixels_per_mm
}

/// Trace the edge mask into raw lines no shorter than
/// `length_threshold · max(w, h)` pixels. Consumes the mask.
pub fn find_lines(
    edge: EdgeMask,
    length_threshold: f64,
    focal_mm: f64,
    crop_factor: f64,
    options: &TraceOptions,
) -> Vec<RawLine> {
    let t0 = Instant::now();
    let (w, h) = (edge.width(), edge.height());
    let longest = w.max(h) as f64;
    let min_points = (length_threshold * longest).floor().max(0.0) as usize;
    let focal_px = focal_length_pixels(focal_mm, crop_factor, w, h);
    let lines = trace_lines(&edge, min_points, focal_px, options);
    debug!(
        "find_lines: {}x{} lmin={} focal_px={:.1} lines={} valid={} elapsed_ms={:.3}",
        w,
        h,
        min_points,
        focal_px,
        lines.len(),
        lines.iter().filter(|l| l.is_valid()).count(),
        t0.elapsed().as_secs_f64() * 1000.0
    );
    lines
}

/// Multiply every point of every line by `scale` (rounded to the pixel grid).
pub fn scale_lines(lines: &mut [RawLine], scale: f64) {
    for line in lines {
        for p in &mut line.points {
            p[0] = (p[0] as f64 * scale).round() as i32;
            p[1] = (p[1] as f64 * scale).round() as i32;
        }
    }
}

/// `count` control points of mode `Line(line_id)` evenly spread along a chain.
///
/// With `n` points the chain is cut into `count` intervals of `(n−1)/count`;
/// each control point joins the (truncated) start and stop index of one
/// interval. Chains with fewer than two points give nothing.
pub fn control_points_along(
    line: &RawLine,
    image: usize,
    line_id: u32,
    count: usize,
) -> Vec<ControlPoint> {
    let n = line.points.len();
    if n < 2 || count == 0 {
        return Vec::new();
    }
    let interval = (n - 1) as f64 / count as f64;
    (0..count)
        .filter_map(|k| {
            let start = (k as f64 * interval) as usize;
            let stop = (((k + 1) as f64 * interval) as usize).min(n - 1);
            if start == stop {
                return None;
            }
            let a = line.points[start];
            let b = line.points[stop];
            Some(ControlPoint::new(
                image,
                [a[0] as f64, a[1] as f64],
                image,
                [b[0] as f64, b[1] as f64],
                CpMode::Line(line_id),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edges::{BACKGROUND, EDGE};
    use crate::image::GrayImageU8;
    use approx::assert_relative_eq;

    fn mask_with(w: usize, h: usize, pixels: impl IntoIterator<Item = (usize, usize)>) -> EdgeMask {
        let mut mask = GrayImageU8::filled(w, h, BACKGROUND);
        for (x, y) in pixels {
            mask.set(x, y, EDGE);
        }
        EdgeMask {
            mask,
            inv_scale: 1.0,
        }
    }

    #[test]
    fn focal_length_pixels_formula() {
        assert_relative_eq!(focal_length_pixels(10.0, 1.0, 400, 300), 72_000.0);
        assert_relative_eq!(focal_length_pixels(10.0, 2.0, 400, 300), 250.0);
    }

    #[test]
    fn vertical_column_is_one_valid_line() {
        let edge = mask_with(100, 200, (20..180).map(|y| (40, y)));
        let lines = find_lines(edge, 0.05, 24.0, 1.0, &TraceOptions::default());
        assert_eq!(lines.len(), 1);
        assert!(lines[0].is_valid());
        assert_eq!(lines[0].points.first(), Some(&[40, 20]));
        assert_eq!(lines[0].points.last(), Some(&[40, 179]));
    }

    #[test]
    fn short_chains_are_discarded() {
        // lmin = floor(0.05 * 200) = 10
        let edge = mask_with(100, 200, (0..8).map(|y| (10, y)));
        assert!(find_lines(edge, 0.05, 24.0, 1.0, &TraceOptions::default()).is_empty());
    }

    #[test]
    fn staircase_is_thinned_to_a_diagonal() {
        let mut pixels = Vec::new();
        for i in 0..40 {
            pixels.push((10 + i, 10 + i));
            pixels.push((11 + i, 10 + i));
        }
        let edge = mask_with(100, 100, pixels);
        let lines = find_lines(edge, 0.05, 24.0, 1.0, &TraceOptions::default());
        assert_eq!(lines.len(), 1);
        assert!(lines[0].is_valid());
    }

    #[test]
    fn crossing_lines_are_split_at_the_junction() {
        let mut pixels: Vec<(usize, usize)> = (10..90).map(|y| (50, y)).collect();
        pixels.extend((10..90).filter(|&x| x != 50).map(|x| (x, 50)));
        let edge = mask_with(100, 100, pixels);
        let lines = find_lines(edge, 0.05, 24.0, 1.0, &TraceOptions::default());
        assert_eq!(lines.len(), 4);
        assert!(lines.iter().all(|l| l.is_valid()));
    }

    #[test]
    fn scale_lines_multiplies_points() {
        let mut lines = vec![RawLine::new(vec![[1, 2], [3, 4]], LineStatus::Valid)];
        scale_lines(&mut lines, 2.5);
        assert_eq!(lines[0].points, vec![[3, 5], [8, 10]]);
    }

    #[test]
    fn control_points_along_chain() {
        let line = RawLine::new((0..11).map(|y| [5, y]).collect(), LineStatus::Valid);
        let cps = control_points_along(&line, 3, 7, 2);
        assert_eq!(cps.len(), 2);
        assert_eq!(cps[0].p1, [5.0, 0.0]);
        assert_eq!(cps[0].p2, [5.0, 5.0]);
        assert_eq!(cps[1].p1, [5.0, 5.0]);
        assert_eq!(cps[1].p2, [5.0, 10.0]);
        assert!(cps.iter().all(|c| c.mode == CpMode::Line(7) && c.image1 == 3));
    }
}
