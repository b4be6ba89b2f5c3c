//! Remapping of non-rectilinear images onto an equirectangular canvas, where
//! vertical lines of the scene become vertical image columns.
//!
//! The canvas is a single-image panorama: the source lens with yaw, pitch
//! and translation zeroed (roll kept), projected equirectangularly. Its
//! field of view comes from a [`PanoramaFit`]; tall canvases are cut down to
//! a 90° band.
mod fit;
mod interp;

pub use fit::{BorderFit, FitResult, PanoramaFit};
pub use interp::sample_cubic;

use crate::image::{GrayImageU8, ImageF32, ImageU8, ImageView};
use crate::lens::SrcImage;
use crate::panorama::PanoramaOptions;
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Canvas settings for [`remap_to_equirect`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RemapSettings {
    /// Canvas width in pixels.
    pub width: usize,
    /// Vertical field of view above which the canvas height is reduced.
    pub max_vfov_deg: f64,
    /// Erosion radius applied to the validity mask, 0 to disable.
    pub erode_radius: usize,
}

/// Remapped raster, its validity mask and the inverse transform back to the
/// source image.
#[derive(Clone, Debug)]
pub struct RemapContext {
    pub image: ImageF32,
    /// 255 where the canvas pixel has a valid source sample, else 0.
    pub mask: GrayImageU8,
    source: SrcImage,
    options: PanoramaOptions,
}

impl RemapContext {
    pub fn width(&self) -> usize {
        self.image.w
    }

    pub fn height(&self) -> usize {
        self.image.h
    }

    pub fn options(&self) -> &PanoramaOptions {
        &self.options
    }

    /// Source-image position of canvas point `(x, y)`; `None` outside the
    /// canvas or the projection domain. The result may still lie outside
    /// the source image.
    pub fn to_source(&self, x: f64, y: f64) -> Option<[f64; 2]> {
        if !(x >= 0.0 && y >= 0.0 && x < self.width() as f64 && y < self.height() as f64) {
            return None;
        }
        let ray = self.options.canvas_to_ray(x, y)?;
        self.source
            .pano_ray_to_image(&ray)
            .filter(|p| p[0].is_finite() && p[1].is_finite())
    }
}

/// Canvas options for `source`: equirectangular, `settings.width` wide, sized
/// by `fit`, with the vertical field of view capped.
pub fn canvas_options(
    source: &SrcImage,
    settings: &RemapSettings,
    fit: &dyn PanoramaFit,
) -> Option<PanoramaOptions> {
    let mut options = PanoramaOptions::equirectangular(settings.width);
    let fitted = fit.fit(source, &options)?;
    options.hfov_deg = fitted.hfov_deg;
    options.height = fitted.height;
    let vfov = options.vfov_deg();
    if vfov > settings.max_vfov_deg {
        options.height = (options.height as f64 * 90.0 / vfov).round() as usize;
        debug!(
            "canvas_options: vfov={:.1} exceeds {:.1}, height -> {}",
            vfov, settings.max_vfov_deg, options.height
        );
    }
    (options.width > 0 && options.height > 0).then_some(options)
}

/// Remap `gray` (described by `lens`) onto an equirectangular canvas.
///
/// Canvas pixels without a source sample are 0 in the image and the mask;
/// an `opacity` mask of the source size clears further pixels. Returns
/// `None` when no canvas could be fitted.
pub fn remap_to_equirect(
    lens: &SrcImage,
    gray: &ImageF32,
    opacity: Option<&ImageU8<'_>>,
    settings: &RemapSettings,
    fit: &dyn PanoramaFit,
) -> Option<RemapContext> {
    let t0 = Instant::now();
    let source = SrcImage {
        yaw_deg: 0.0,
        pitch_deg: 0.0,
        translation: [0.0; 3],
        ..lens.clone()
    };
    let options = canvas_options(&source, settings, fit)?;
    let (w, h) = (options.width, options.height);

    let mut pixels = vec![0.0f32; w * h];
    let mut valid = vec![0u8; w * h];
    pixels
        .par_chunks_mut(w)
        .zip(valid.par_chunks_mut(w))
        .enumerate()
        .for_each(|(y, (row, mask_row))| {
            for x in 0..w {
                let Some(ray) = options.canvas_to_ray(x as f64, y as f64) else {
                    continue;
                };
                let Some([sx, sy]) = source.pano_ray_to_image(&ray) else {
                    continue;
                };
                if !source.contains(sx, sy) {
                    continue;
                }
                if let Some(op) = opacity {
                    let ox = (sx as usize).min(op.w.saturating_sub(1));
                    let oy = (sy as usize).min(op.h.saturating_sub(1));
                    if op.get(ox, oy) == 0 {
                        continue;
                    }
                }
                row[x] = sample_cubic(gray, sx, sy).clamp(0.0, 255.0);
                mask_row[x] = 255;
            }
        });

    let mut mask = GrayImageU8::new(w, h, valid);
    if settings.erode_radius > 0 {
        mask = erode(&mask, settings.erode_radius);
    }
    debug!(
        "remap_to_equirect: {}x{} -> {}x{} hfov={:.2} elapsed_ms={:.3}",
        gray.w,
        gray.h,
        w,
        h,
        options.hfov_deg,
        t0.elapsed().as_secs_f64() * 1000.0
    );
    Some(RemapContext {
        image: ImageF32 {
            w,
            h,
            stride: w,
            data: pixels,
        },
        mask,
        source,
        options,
    })
}

/// Square min filter of `radius`; pixels outside the image count as 0.
fn erode(mask: &GrayImageU8, radius: usize) -> GrayImageU8 {
    let (w, h) = (mask.width(), mask.height());
    let mut horiz = GrayImageU8::filled(w, h, 0);
    for y in 0..h {
        for x in 0..w {
            let lo = x.checked_sub(radius);
            let hi = x + radius;
            let v = match lo {
                Some(lo) if hi < w => (lo..=hi).map(|xx| mask.get(xx, y)).min().unwrap_or(0),
                _ => 0,
            };
            horiz.set(x, y, v);
        }
    }
    let mut out = GrayImageU8::filled(w, h, 0);
    for y in 0..h {
        let Some(lo) = y.checked_sub(radius) else {
            continue;
        };
        if y + radius >= h {
            continue;
        }
        for x in 0..w {
            let v = (lo..=y + radius)
                .map(|yy| horiz.get(x, yy))
                .min()
                .unwrap_or(0);
            out.set(x, y, v);
        }
    }
    out
}
