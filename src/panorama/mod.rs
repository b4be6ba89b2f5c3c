//! Minimal panorama model: images, control points, output options and the
//! set of variables an optimizer may change.

mod control_point;
mod stats;

pub use control_point::{ControlPoint, CpMode};
pub use stats::ErrorStats;

use crate::lens::{Projection, SrcImage};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Image variables an optimizer can be allowed to change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageVariable {
    Yaw,
    Pitch,
    Roll,
}

/// Free variables per image, indexed like `Panorama::images`.
pub type OptimizeVector = Vec<BTreeSet<ImageVariable>>;

/// Output canvas of a panorama.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PanoramaOptions {
    pub projection: Projection,
    pub width: usize,
    pub height: usize,
    pub hfov_deg: f64,
}

impl Default for PanoramaOptions {
    fn default() -> Self {
        Self {
            projection: Projection::Equirectangular,
            width: 3000,
            height: 1500,
            hfov_deg: 360.0,
        }
    }
}

impl PanoramaOptions {
    /// Full-sphere equirectangular canvas `width` pixels wide.
    pub fn equirectangular(width: usize) -> Self {
        Self {
            width,
            height: width / 2,
            ..Default::default()
        }
    }

    /// Focal length of the canvas in pixels.
    pub fn focal_px(&self) -> f64 {
        self.projection
            .focal_from_hfov(self.hfov_deg.to_radians(), self.width as f64)
    }

    /// Vertical field of view implied by width, height and hfov.
    pub fn vfov_deg(&self) -> f64 {
        let f = self.focal_px();
        match self
            .projection
            .offset_to_ray(0.0, 0.5 * self.height as f64, f)
        {
            Some(ray) => 2.0 * ray.y.atan2(ray.z).to_degrees(),
            None => 180.0,
        }
    }

    /// Canvas pixel to panorama-frame ray.
    pub fn canvas_to_ray(&self, x: f64, y: f64) -> Option<nalgebra::Vector3<f64>> {
        self.projection.offset_to_ray(
            x - 0.5 * self.width as f64,
            y - 0.5 * self.height as f64,
            self.focal_px(),
        )
    }
}

/// Images, control points and optimizer configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Panorama {
    images: Vec<SrcImage>,
    control_points: Vec<ControlPoint>,
    options: PanoramaOptions,
    optimize_vector: OptimizeVector,
}

impl Panorama {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an image and return its index.
    pub fn add_image(&mut self, image: SrcImage) -> usize {
        self.images.push(image);
        self.images.len() - 1
    }

    pub fn image(&self, index: usize) -> Option<&SrcImage> {
        self.images.get(index)
    }

    pub fn image_mut(&mut self, index: usize) -> Option<&mut SrcImage> {
        self.images.get_mut(index)
    }

    pub fn images(&self) -> &[SrcImage] {
        &self.images
    }

    pub fn add_control_point(&mut self, cp: ControlPoint) {
        self.control_points.push(cp);
    }

    pub fn control_points(&self) -> &[ControlPoint] {
        &self.control_points
    }

    pub fn control_points_mut(&mut self) -> &mut [ControlPoint] {
        &mut self.control_points
    }

    pub fn take_control_points(&mut self) -> Vec<ControlPoint> {
        std::mem::take(&mut self.control_points)
    }

    pub fn options(&self) -> &PanoramaOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: PanoramaOptions) {
        self.options = options;
    }

    pub fn optimize_vector(&self) -> &OptimizeVector {
        &self.optimize_vector
    }

    pub fn set_optimize_vector(&mut self, optimize_vector: OptimizeVector) {
        self.optimize_vector = optimize_vector;
    }

    /// Statistics over the current control-point errors.
    pub fn error_stats(&self) -> Option<ErrorStats> {
        ErrorStats::from_control_points(&self.control_points)
    }
}
