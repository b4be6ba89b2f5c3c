//! Edge processing: gradients, non‑maximum suppression and the Canny mask.
//!
//! - Central-difference gradients returning `gx`, `gy` and magnitude.
//! - Non‑maximum suppression along the quantized gradient direction.
//! - [`detect_edges`] chains bounded resizing, Gaussian smoothing, gradients
//!   and NMS into a binary [`EdgeMask`] (0 = edge, 255 = background).
//!
//! Borders are handled by clamping indices (replicate).

pub mod canny;
pub mod grad;
pub mod nms;

pub use canny::{canny_mask, detect_edges, EdgeMask, BACKGROUND, EDGE};
pub use grad::{image_gradients, Grad};
