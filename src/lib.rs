#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod config;
pub mod detector;
pub mod diagnostics;
pub mod image;
pub mod lens;
pub mod panorama;

// Building blocks of the pipeline, public for tools and tests.
pub mod angle;
pub mod edges;
pub mod lines;
pub mod optimize;
pub mod remap;
pub mod resize;

// --- High-level re-exports -------------------------------------------------

pub use crate::detector::{DetectError, DetectJob, VerticalLineDetector, VerticalLineParams};
pub use crate::diagnostics::DetectionReport;
pub use crate::optimize::{Optimizer, SharedOptimizer};
pub use crate::panorama::{ControlPoint, CpMode, Panorama};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
pub mod prelude {
    pub use crate::image::{ImageRgb8, ImageU8, SourceImage};
    pub use crate::lens::{Projection, SrcImage};
    pub use crate::{
        ControlPoint, CpMode, DetectError, DetectionReport, Panorama, SharedOptimizer,
        VerticalLineDetector, VerticalLineParams,
    };
}
