//! Vertical line detector producing `X` control points for panorama levelling.
//!
//! - [`params`]: detector configuration, serde-friendly for tool configs.
//! - `pipeline`: the [`VerticalLineDetector`] entry point.
//! - `synth`: maps filtered lines back to original image coordinates.
//! - `validate`: optimiser-driven outlier rejection and ranking.

pub mod params;
mod pipeline;
mod synth;
mod validate;

pub use params::VerticalLineParams;
pub use pipeline::{DetectJob, VerticalLineDetector};
pub use synth::{synthesize, EndpointMap};

use thiserror::Error;

/// Caller contract violations. In-pipeline rejections never surface here;
/// they only shrink the result.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DetectError {
    #[error("image index {index} out of range, panorama has {count} images")]
    ImageIndexOutOfRange { index: usize, count: usize },
    #[error("raster is {actual:?}, image {index} is {expected:?}")]
    RasterSizeMismatch {
        index: usize,
        expected: [usize; 2],
        actual: [usize; 2],
    },
    #[error("mask is {mask:?}, raster is {raster:?}")]
    MaskSizeMismatch { mask: [usize; 2], raster: [usize; 2] },
    #[error("raster buffer is smaller than its dimensions require")]
    MalformedRaster,
}
