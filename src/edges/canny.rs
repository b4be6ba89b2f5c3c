//! Canny-type edge detector producing a binary mask.
//!
//! Stages: bounded resize, Gaussian smoothing (`σ = scale`), central
//! difference gradients, non‑maximum suppression with a single magnitude
//! threshold. Edge pixels are 0 on a 255 background.
use super::grad::image_gradients;
use super::nms::run_nms;
use crate::image::{GrayImageU8, ImageF32, ImageU8, ImageView, ImageViewMut};
use crate::resize::filters::{apply as apply_filter, GaussianKernel};
use crate::resize::resize_to_bound;

/// Mask value marking an edge pixel.
pub const EDGE: u8 = 0;
/// Mask value marking background.
pub const BACKGROUND: u8 = 255;

/// Binary edge image at working resolution.
#[derive(Clone, Debug)]
pub struct EdgeMask {
    pub mask: GrayImageU8,
    /// `original / working` scale of the mask.
    pub inv_scale: f64,
}

impl EdgeMask {
    pub fn width(&self) -> usize {
        self.mask.width()
    }

    pub fn height(&self) -> usize {
        self.mask.height()
    }

    #[inline]
    pub fn is_edge(&self, x: usize, y: usize) -> bool {
        self.mask.get(x, y) == EDGE
    }

    pub fn edge_count(&self) -> usize {
        self.mask.data().iter().filter(|&&v| v == EDGE).count()
    }

    /// Reset edges where `opacity` is 0. A mask of another size is resampled
    /// (nearest neighbour) to the edge resolution first.
    pub fn apply_mask(&mut self, opacity: &ImageU8<'_>) {
        let (w, h) = (self.width(), self.height());
        if opacity.w == 0 || opacity.h == 0 {
            return;
        }
        let sx = opacity.w as f64 / w.max(1) as f64;
        let sy = opacity.h as f64 / h.max(1) as f64;
        for y in 0..h {
            let oy = (((y as f64 + 0.5) * sy) as usize).min(opacity.h - 1);
            let src = opacity.row(oy);
            let dst = self.mask.row_mut(y);
            for (x, px) in dst.iter_mut().enumerate() {
                let ox = (((x as f64 + 0.5) * sx) as usize).min(opacity.w - 1);
                if src[ox] == 0 {
                    *px = BACKGROUND;
                }
            }
        }
    }
}

/// Detect edges on `gray` after bounding its larger side by `max_dim`.
pub fn detect_edges(gray: &ImageF32, scale: f32, threshold: f32, max_dim: usize) -> EdgeMask {
    let resized = resize_to_bound(gray, max_dim);
    let mask = canny_mask(&resized.image, scale, threshold);
    EdgeMask {
        mask,
        inv_scale: resized.inv_scale,
    }
}

/// Canny edge mask of `image` without resizing.
pub fn canny_mask(image: &ImageF32, scale: f32, threshold: f32) -> GrayImageU8 {
    let smoothed = apply_filter(&GaussianKernel::new(scale), image);
    let grad = image_gradients(&smoothed);
    let mut mask = GrayImageU8::filled(image.w, image.h, BACKGROUND);
    run_nms(&grad, threshold, |x, y| mask.set(x, y, EDGE));
    mask
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_image(width: usize, height: usize, split_x: usize) -> ImageF32 {
        let mut img = ImageF32::new(width, height);
        for y in 0..height {
            for x in split_x..width {
                img.set(x, y, 200.0);
            }
        }
        img
    }

    #[test]
    fn vertical_step_gives_single_pixel_column() {
        let img = step_image(40, 30, 20);
        let edges = detect_edges(&img, 2.0, 4.0, 1600);
        assert_eq!(edges.inv_scale, 1.0);
        for y in 1..29 {
            let cols: Vec<usize> = (0..40).filter(|&x| edges.is_edge(x, y)).collect();
            assert_eq!(cols.len(), 1, "row {y}: {cols:?}");
            assert!((19..=20).contains(&cols[0]));
        }
    }

    #[test]
    fn flat_image_has_no_edges() {
        let mut img = ImageF32::new(20, 20);
        img.data.iter_mut().for_each(|v| *v = 90.0);
        let edges = detect_edges(&img, 2.0, 4.0, 1600);
        assert_eq!(edges.edge_count(), 0);
    }

    #[test]
    fn large_image_is_downsampled_first() {
        let img = step_image(400, 100, 200);
        let edges = detect_edges(&img, 2.0, 4.0, 100);
        assert_eq!((edges.width(), edges.height()), (100, 25));
        assert!((edges.inv_scale - 4.0).abs() < 1e-12);
        assert!(edges.edge_count() > 0);
    }

    #[test]
    fn opacity_mask_removes_edges() {
        let img = step_image(40, 30, 20);
        let mut edges = detect_edges(&img, 2.0, 4.0, 1600);
        let opacity = vec![0u8; 40 * 30];
        edges.apply_mask(&ImageU8::packed(40, 30, &opacity));
        assert_eq!(edges.edge_count(), 0);
    }
}
