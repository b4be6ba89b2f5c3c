//! Parameters of the vertical line detector.
//!
//! Defaults reproduce the reference behaviour: edges at σ = 2 with a
//! threshold of 4 grey levels on images bounded to 1600 px, lines of at least
//! 5 % of the longer side, and the 0.1 / 0.05 vertical tolerances of the
//! multi-line and single-line paths.

use crate::lines::{FilterParams, TraceOptions};
use crate::remap::RemapSettings;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerticalLineParams {
    /// Larger side of the working raster; also the remap canvas width.
    pub max_dim: usize,
    /// Gaussian σ of the edge detector.
    pub edge_scale: f32,
    /// Gradient magnitude threshold in grey levels per pixel.
    pub edge_threshold: f32,
    /// Minimum raw line length as a fraction of the longer side.
    pub length_threshold: f64,
    /// Added to the remapped canvas size when bounding edge detection, so the
    /// remapped raster is never downsampled.
    pub remap_margin: usize,
    /// Remap canvases taller than this are cut to a 90° band.
    pub max_vfov_deg: f64,
    pub filter: FilterParams,
    /// Vertical deviation accepted when only one candidate survives.
    pub single_line_max_deviation: f64,
    /// Line length (original pixels) at which the length merit saturates.
    pub merit_length_cap: f64,
    pub trace: TraceOptions,
}

impl Default for VerticalLineParams {
    fn default() -> Self {
        Self {
            max_dim: 1600,
            edge_scale: 2.0,
            edge_threshold: 4.0,
            length_threshold: 0.05,
            remap_margin: 10,
            max_vfov_deg: 100.0,
            filter: FilterParams::default(),
            single_line_max_deviation: 0.05,
            merit_length_cap: 500.0,
            trace: TraceOptions::default(),
        }
    }
}

impl VerticalLineParams {
    /// Remap canvas settings; the validity mask is eroded by the Gaussian
    /// kernel radius.
    pub fn remap_settings(&self) -> RemapSettings {
        RemapSettings {
            width: self.max_dim,
            max_vfov_deg: self.max_vfov_deg,
            erode_radius: (3.0 * self.edge_scale.max(0.0)).ceil() as usize,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let params: VerticalLineParams =
            serde_json::from_str(r#"{ "max_dim": 800, "filter": { "min_length": 30.0 } }"#)
                .unwrap();
        assert_eq!(params.max_dim, 800);
        assert_eq!(params.filter.min_length, 30.0);
        assert_eq!(params.filter.duplicate_distance, 80.0);
        assert_eq!(params.edge_threshold, 4.0);
        assert_eq!(params.trace, TraceOptions::default());
    }

    #[test]
    fn erosion_matches_kernel_radius() {
        assert_eq!(VerticalLineParams::default().remap_settings().erode_radius, 6);
    }
}
