//! Bounded, area-preserving downsampling.
//!
//! The working raster keeps the aspect ratio of the source and has its larger
//! side capped at `max_dim`. Every output pixel is the coverage-weighted mean
//! of the source pixels under its footprint (a box filter with fractional
//! edges), applied separably. No extra low-pass is introduced, so identical
//! inputs give identical outputs.
//!
//! The returned `inv_scale` (`original / working`) maps working coordinates
//! back to the source frame.

pub mod filters;

use crate::image::{ImageF32, ImageView, ImageViewMut};

/// Downsampled raster plus the factor mapping it back to the source.
#[derive(Clone, Debug)]
pub struct Resized {
    pub image: ImageF32,
    /// `original / working`; 1.0 when no resampling happened.
    pub inv_scale: f64,
}

/// Working dimensions for a `w × h` source bounded by `max_dim`.
///
/// Returns `None` when the source already fits.
pub fn bounded_dimensions(w: usize, h: usize, max_dim: usize) -> Option<(usize, usize, f64)> {
    if w <= max_dim && h <= max_dim {
        return None;
    }
    let max_dim = max_dim.max(1);
    if w >= h {
        let factor = max_dim as f64 / w as f64;
        let nh = (0.5 + factor * h as f64) as usize;
        Some((max_dim, nh.max(1), factor))
    } else {
        let factor = max_dim as f64 / h as f64;
        let nw = (0.5 + factor * w as f64) as usize;
        Some((nw.max(1), max_dim, factor))
    }
}

/// Resize `src` so its larger side does not exceed `max_dim`.
pub fn resize_to_bound(src: &ImageF32, max_dim: usize) -> Resized {
    match bounded_dimensions(src.w, src.h, max_dim) {
        None => Resized {
            image: src.clone(),
            inv_scale: 1.0,
        },
        Some((nw, nh, factor)) => Resized {
            image: resample_area(src, nw, nh),
            inv_scale: 1.0 / factor,
        },
    }
}

/// Area resampling of `src` to exactly `dst_w × dst_h`.
pub fn resample_area(src: &ImageF32, dst_w: usize, dst_h: usize) -> ImageF32 {
    if src.w == 0 || src.h == 0 || dst_w == 0 || dst_h == 0 {
        return ImageF32::new(dst_w, dst_h);
    }
    let cols = coverage_weights(src.w, dst_w);
    let rows = coverage_weights(src.h, dst_h);

    let mut horiz = ImageF32::new(dst_w, src.h);
    for y in 0..src.h {
        let src_row = src.row(y);
        let dst_row = horiz.row_mut(y);
        for (dst, weights) in dst_row.iter_mut().zip(&cols) {
            *dst = weights.iter().map(|&(i, wgt)| src_row[i] * wgt).sum();
        }
    }

    let mut out = ImageF32::new(dst_w, dst_h);
    for (y, weights) in rows.iter().enumerate() {
        let dst_row = out.row_mut(y);
        for &(sy, wgt) in weights {
            let src_row = horiz.row(sy);
            for (dst, &v) in dst_row.iter_mut().zip(src_row) {
                *dst += v * wgt;
            }
        }
    }
    out
}

/// Per output index, the source indices it covers with normalised weights.
fn coverage_weights(src_len: usize, dst_len: usize) -> Vec<Vec<(usize, f32)>> {
    let step = src_len as f64 / dst_len as f64;
    (0..dst_len)
        .map(|i| {
            let start = i as f64 * step;
            let end = ((i + 1) as f64 * step).min(src_len as f64);
            let first = start.floor() as usize;
            let last = (end.ceil() as usize).min(src_len);
            let mut weights = Vec::with_capacity(last.saturating_sub(first));
            let mut total = 0.0f64;
            for s in first..last {
                let lo = start.max(s as f64);
                let hi = end.min((s + 1) as f64);
                let cover = hi - lo;
                if cover > 0.0 {
                    weights.push((s, cover));
                    total += cover;
                }
            }
            if total <= 0.0 {
                let s = first.min(src_len - 1);
                return vec![(s, 1.0)];
            }
            weights
                .into_iter()
                .map(|(s, c)| (s, (c / total) as f32))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(w: usize, h: usize) -> ImageF32 {
        let mut img = ImageF32::new(w, h);
        for y in 0..h {
            for x in 0..w {
                img.set(x, y, (x + 3 * y) as f32);
            }
        }
        img
    }

    #[test]
    fn small_image_is_copied_unscaled() {
        let img = ramp(40, 30);
        let out = resize_to_bound(&img, 40);
        assert_eq!(out.inv_scale, 1.0);
        assert_eq!(out.image, img);
    }

    #[test]
    fn landscape_image_is_bounded_by_width() {
        let img = ramp(400, 250);
        let out = resize_to_bound(&img, 100);
        assert_eq!((out.image.w, out.image.h), (100, 63));
        assert!((out.inv_scale - 4.0).abs() < 1e-12);
    }

    #[test]
    fn portrait_image_is_bounded_by_height() {
        let img = ramp(90, 300);
        let out = resize_to_bound(&img, 150);
        assert_eq!((out.image.w, out.image.h), (45, 150));
        assert!((out.inv_scale - 2.0).abs() < 1e-12);
    }

    #[test]
    fn area_resampling_averages_blocks() {
        let mut img = ImageF32::new(4, 2);
        img.data = vec![0.0, 2.0, 4.0, 6.0, 0.0, 2.0, 4.0, 6.0];
        let out = resample_area(&img, 2, 1);
        assert_eq!(out.data, vec![1.0, 5.0]);
    }

    #[test]
    fn area_resampling_preserves_mean() {
        let img = ramp(37, 23);
        let out = resample_area(&img, 11, 7);
        let mean_in: f32 = img.data.iter().sum::<f32>() / img.data.len() as f32;
        let mean_out: f32 = out.data.iter().sum::<f32>() / out.data.len() as f32;
        assert!((mean_in - mean_out).abs() < 0.5);
    }
}
