use crate::lens::SrcImage;
use crate::panorama::PanoramaOptions;
use log::debug;
use serde::Serialize;

/// Canvas extent chosen for a single-image panorama.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct FitResult {
    pub hfov_deg: f64,
    pub height: usize,
}

/// Chooses the field of view and height of a canvas so that it covers an
/// image.
pub trait PanoramaFit {
    /// `None` when no finite canvas covers the image.
    fn fit(&self, image: &SrcImage, options: &PanoramaOptions) -> Option<FitResult>;
}

/// Fit from the longitude and latitude reached along the image border.
#[derive(Clone, Copy, Debug)]
pub struct BorderFit {
    /// Samples per image side.
    pub samples_per_side: usize,
}

impl Default for BorderFit {
    fn default() -> Self {
        Self {
            samples_per_side: 64,
        }
    }
}

impl BorderFit {
    fn border_points(&self, w: f64, h: f64) -> Vec<[f64; 2]> {
        let n = self.samples_per_side.max(2);
        let mut pts = Vec::with_capacity(4 * n + 1);
        for i in 0..=n {
            let t = i as f64 / n as f64;
            pts.push([t * w, 0.0]);
            pts.push([t * w, h]);
            pts.push([0.0, t * h]);
            pts.push([w, t * h]);
        }
        pts
    }
}

impl PanoramaFit for BorderFit {
    fn fit(&self, image: &SrcImage, options: &PanoramaOptions) -> Option<FitResult> {
        let (w, h) = (image.width as f64, image.height as f64);
        let (mut max_lon, mut max_lat) = (0.0f64, 0.0f64);
        for [x, y] in self.border_points(w, h) {
            let Some(ray) = image.image_to_pano_ray(x, y) else {
                continue;
            };
            max_lon = max_lon.max(ray.x.atan2(ray.z).abs());
            max_lat = max_lat.max(ray.y.clamp(-1.0, 1.0).asin().abs());
        }
        let hfov = (2.0 * max_lon.to_degrees()).min(360.0);
        let vfov = (2.0 * max_lat.to_degrees()).min(180.0);
        if !(hfov > 0.0 && vfov > 0.0) {
            return None;
        }
        let height = (options.width as f64 * vfov / hfov).round() as usize;
        debug!(
            "BorderFit::fit hfov={:.2} vfov={:.2} height={}",
            hfov, vfov, height
        );
        (height > 0).then_some(FitResult {
            hfov_deg: hfov,
            height,
        })
    }
}
