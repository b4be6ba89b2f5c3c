//! Non‑maximum suppression on gradient magnitude with direction alignment.
//!
//! For each pixel above the magnitude threshold, the two neighbours along the
//! gradient direction (quantized to 0°, 45°, 90°, 135°) are compared. The
//! pixel survives when it is strictly greater than the "backward" neighbour
//! and not smaller than the "forward" one; the asymmetric comparison keeps
//! exactly one pixel of a plateau pair, which symmetric step edges produce.
//!
//! Border handling ignores the outermost 1‑pixel frame to avoid out‑of‑bounds
//! checks in neighbour lookup.
use crate::edges::grad::Grad;
use crate::image::ImageView;

const TAN_22_5_DEG: f32 = 0.41421356237;

/// Visit every surviving pixel as `(x, y)`.
pub fn run_nms(grad: &Grad, mag_thresh: f32, mut emit: impl FnMut(usize, usize)) {
    let w = grad.gx.w;
    let h = grad.gx.h;
    if w < 3 || h < 3 {
        return;
    }

    for y in 1..h - 1 {
        let mag_prev = grad.mag.row(y - 1);
        let mag_row = grad.mag.row(y);
        let mag_next = grad.mag.row(y + 1);
        let gx_row = grad.gx.row(y);
        let gy_row = grad.gy.row(y);

        for x in 1..w - 1 {
            let mag = mag_row[x];
            if mag < mag_thresh || mag <= 0.0 {
                continue;
            }

            let gx = gx_row[x];
            let gy = gy_row[x];
            let abs_gx = gx.abs();
            let abs_gy = gy.abs();
            let same_sign = (gx >= 0.0 && gy >= 0.0) || (gx <= 0.0 && gy <= 0.0);

            let (backward, forward) = if abs_gx >= abs_gy {
                if abs_gy <= abs_gx * TAN_22_5_DEG {
                    (mag_row[x - 1], mag_row[x + 1])
                } else if same_sign {
                    (mag_prev[x - 1], mag_next[x + 1])
                } else {
                    (mag_next[x - 1], mag_prev[x + 1])
                }
            } else if abs_gx <= abs_gy * TAN_22_5_DEG {
                (mag_prev[x], mag_next[x])
            } else if same_sign {
                (mag_prev[x - 1], mag_next[x + 1])
            } else {
                (mag_next[x - 1], mag_prev[x + 1])
            };

            if mag <= backward || mag < forward {
                continue;
            }
            emit(x, y);
        }
    }
}
