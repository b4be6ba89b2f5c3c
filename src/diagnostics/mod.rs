//! Diagnostics returned by the detector next to its control points.
//!
//! [`DetectionReport`] records how many items survived each stage, why
//! candidates were dropped, what the validator's optimizer did and how long
//! every stage took.

mod timing;

pub use timing::{StageTiming, TimingBreakdown};

use crate::optimize::OptimizeReport;
use crate::panorama::{ControlPoint, ErrorStats};
use serde::Serialize;

/// Reason a candidate was dropped after line filtering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Rejection {
    /// An endpoint had no inverse through the remapper.
    InverseTransformUnavailable,
    /// An endpoint fell outside the original image.
    PointOutOfBounds,
    /// The validator judged the residual too large.
    ResidualOutlier,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectionCounts {
    pub inverse_transform_unavailable: usize,
    pub point_out_of_bounds: usize,
    pub residual_outlier: usize,
}

impl RejectionCounts {
    pub fn record(&mut self, rejection: Rejection) {
        match rejection {
            Rejection::InverseTransformUnavailable => self.inverse_transform_unavailable += 1,
            Rejection::PointOutOfBounds => self.point_out_of_bounds += 1,
            Rejection::ResidualOutlier => self.residual_outlier += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.inverse_transform_unavailable + self.point_out_of_bounds + self.residual_outlier
    }
}

/// Number of items leaving each stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageCounts {
    pub edge_pixels: usize,
    pub raw_lines: usize,
    pub valid_raw_lines: usize,
    pub fitted_lines: usize,
    pub candidates: usize,
    pub validated: usize,
}

/// Outcome of the statistical validation step.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// Optimizer outcome; `None` when it was not run or failed.
    pub optimizer: Option<OptimizeReport>,
    pub error_stats: Option<ErrorStats>,
    /// Errors above this were discarded.
    pub outlier_limit: Option<f64>,
}

/// Full result of one detection call.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionReport {
    pub image: usize,
    pub control_points: Vec<ControlPoint>,
    /// True when lines were detected on an equirectangular remap.
    pub remapped: bool,
    /// Size of the raster edges were detected on.
    pub working_size: [usize; 2],
    /// `original / working` scale; 1 after remapping.
    pub inv_scale: f64,
    pub counts: StageCounts,
    pub rejections: RejectionCounts,
    pub validation: ValidationReport,
    pub timing: TimingBreakdown,
}

impl DetectionReport {
    pub fn new(image: usize) -> Self {
        Self {
            image,
            control_points: Vec::new(),
            remapped: false,
            working_size: [0, 0],
            inv_scale: 1.0,
            counts: StageCounts::default(),
            rejections: RejectionCounts::default(),
            validation: ValidationReport::default(),
            timing: TimingBreakdown::default(),
        }
    }
}
