//! Image gradients with border clamping.
//!
//! - Convolves the central-difference kernel pair (`X` and `Y`) with
//!   replicate borders.
//! - Outputs per‑pixel `gx`, `gy` and `mag = sqrt(gx^2+gy^2)`, in intensity
//!   units per pixel (the unit of the edge threshold).
//!
//! Complexity: O(W·H) per pass; memory: three float buffers.
use crate::image::{ImageF32, ImageView, ImageViewMut};

type Kernel3 = [[f32; 3]; 3];

const CENTRAL_KERNEL_X: Kernel3 = [[0.0, 0.0, 0.0], [-0.5, 0.0, 0.5], [0.0, 0.0, 0.0]];
const CENTRAL_KERNEL_Y: Kernel3 = [[0.0, -0.5, 0.0], [0.0, 0.0, 0.0], [0.0, 0.5, 0.0]];

/// Per‑pixel gradient buffers.
#[derive(Clone, Debug)]
pub struct Grad {
    /// Horizontal derivative (convolution with kernel X)
    pub gx: ImageF32,
    /// Vertical derivative (convolution with kernel Y)
    pub gy: ImageF32,
    /// Euclidean magnitude per pixel: `sqrt(gx^2 + gy^2)`
    pub mag: ImageF32,
}

/// Compute gradients of a single‑channel float image.
pub fn image_gradients(l: &ImageF32) -> Grad {
    let (kernel_x, kernel_y) = (&CENTRAL_KERNEL_X, &CENTRAL_KERNEL_Y);
    let w = l.w;
    let h = l.h;
    let mut gx = ImageF32::new(w, h);
    let mut gy = ImageF32::new(w, h);
    let mut mag = ImageF32::new(w, h);

    if w == 0 || h == 0 {
        return Grad { gx, gy, mag };
    }

    for y in 0..h {
        let y_idx = [y.saturating_sub(1), y, (y + 1).min(h - 1)];
        let rows = [l.row(y_idx[0]), l.row(y_idx[1]), l.row(y_idx[2])];
        let out_gx = gx.row_mut(y);
        let out_gy = gy.row_mut(y);
        let out_mag = mag.row_mut(y);
        for x in 0..w {
            let x_idx = [x.saturating_sub(1), x, (x + 1).min(w - 1)];

            let mut sum_x = 0.0;
            let mut sum_y = 0.0;
            for (ky, yy_row) in rows.iter().enumerate() {
                let kx_row = &kernel_x[ky];
                let ky_row = &kernel_y[ky];
                sum_x += yy_row[x_idx[0]] * kx_row[0]
                    + yy_row[x_idx[1]] * kx_row[1]
                    + yy_row[x_idx[2]] * kx_row[2];
                sum_y += yy_row[x_idx[0]] * ky_row[0]
                    + yy_row[x_idx[1]] * ky_row[1]
                    + yy_row[x_idx[2]] * ky_row[2];
            }

            out_gx[x] = sum_x;
            out_gy[x] = sum_y;
            out_mag[x] = (sum_x * sum_x + sum_y * sum_y).sqrt();
        }
    }

    Grad { gx, gy, mag }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn central_gradient_of_ramp_is_slope() {
        let mut img = ImageF32::new(8, 5);
        for y in 0..5 {
            for x in 0..8 {
                img.set(x, y, 3.0 * x as f32);
            }
        }
        let g = image_gradients(&img);
        assert!((g.gx.get(4, 2) - 3.0).abs() < 1e-6);
        assert!(g.gy.get(4, 2).abs() < 1e-6);
        assert!((g.mag.get(4, 2) - 3.0).abs() < 1e-6);
    }

    #[test]
    fn horizontal_edge_has_vertical_gradient() {
        let mut img = ImageF32::new(6, 6);
        for y in 3..6 {
            for x in 0..6 {
                img.set(x, y, 1.0);
            }
        }
        let g = image_gradients(&img);
        assert!((g.gy.get(3, 3) - 0.5).abs() < 1e-6);
        assert!(g.gx.get(3, 3).abs() < 1e-6);
    }
}
