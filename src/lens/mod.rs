//! Source-image lens model: projection, field of view and orientation.
//!
//! A [`SrcImage`] maps pixel coordinates to unit rays in the camera frame
//! (x right, y down, z forward) and, through its yaw/pitch/roll, to the
//! panorama frame. The optical centre sits at `(width/2, height/2)`.
//!
//! Orientation convention: `camera_from_pano = Rz(roll) · Rx(−pitch) · Ry(−yaw)`.
//! Positive pitch looks up, positive yaw looks right, and a world vertical
//! appears in a rolled image along `(−sin roll, cos roll)`.

mod projection;

pub use projection::Projection;

use nalgebra::{Rotation3, Vector3};
use serde::{Deserialize, Serialize};

/// Diagonal of a full-frame (36×24 mm) sensor.
const FULL_FRAME_DIAGONAL_MM: f64 = 43.266_615_305_567_87;

/// Geometry of one source image in a panorama.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SrcImage {
    pub width: usize,
    pub height: usize,
    pub projection: Projection,
    /// Horizontal field of view in degrees.
    pub hfov_deg: f64,
    pub yaw_deg: f64,
    pub pitch_deg: f64,
    pub roll_deg: f64,
    /// Camera translation; carried for completeness, zeroed in synthetic panoramas.
    pub translation: [f64; 3],
    pub crop_factor: f64,
    /// Focal length from the camera metadata, 0 when unknown.
    pub exif_focal_length_mm: f64,
}

impl Default for SrcImage {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            projection: Projection::Rectilinear,
            hfov_deg: 50.0,
            yaw_deg: 0.0,
            pitch_deg: 0.0,
            roll_deg: 0.0,
            translation: [0.0; 3],
            crop_factor: 1.0,
            exif_focal_length_mm: 0.0,
        }
    }
}

impl SrcImage {
    pub fn new(width: usize, height: usize, projection: Projection, hfov_deg: f64) -> Self {
        Self {
            width,
            height,
            projection,
            hfov_deg,
            ..Default::default()
        }
    }

    pub fn is_rectilinear(&self) -> bool {
        self.projection == Projection::Rectilinear
    }

    /// Copy with yaw, pitch, roll and translation set to zero.
    pub fn with_orientation_zeroed(&self) -> Self {
        Self {
            yaw_deg: 0.0,
            pitch_deg: 0.0,
            roll_deg: 0.0,
            translation: [0.0; 3],
            ..self.clone()
        }
    }

    /// Focal length in pixels implied by the field of view.
    pub fn focal_px(&self) -> f64 {
        self.projection
            .focal_from_hfov(self.hfov_deg.to_radians(), self.width as f64)
    }

    /// Physical focal length: metadata when present, else derived from the
    /// field of view and crop factor.
    pub fn focal_length_mm(&self) -> f64 {
        if self.exif_focal_length_mm > 0.0 {
            self.exif_focal_length_mm
        } else {
            calc_focal_length(
                self.projection,
                self.hfov_deg,
                self.crop_factor,
                self.width,
                self.height,
            )
        }
    }

    /// True when `(x, y)` lies inside `[0, width) × [0, height)`.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= 0.0 && x < self.width as f64 && y >= 0.0 && y < self.height as f64
    }

    fn center(&self) -> [f64; 2] {
        [0.5 * self.width as f64, 0.5 * self.height as f64]
    }

    /// Rotation taking panorama-frame rays into this camera's frame.
    pub fn camera_from_pano(&self) -> Rotation3<f64> {
        orientation(self.yaw_deg, self.pitch_deg, self.roll_deg)
    }

    /// Camera-frame ray through pixel `(x, y)`.
    pub fn image_to_camera_ray(&self, x: f64, y: f64) -> Option<Vector3<f64>> {
        let c = self.center();
        self.projection
            .offset_to_ray(x - c[0], y - c[1], self.focal_px())
    }

    /// Pixel hit by a camera-frame ray.
    pub fn camera_ray_to_image(&self, ray: &Vector3<f64>) -> Option<[f64; 2]> {
        let c = self.center();
        let off = self.projection.ray_to_offset(ray, self.focal_px())?;
        Some([c[0] + off[0], c[1] + off[1]])
    }

    /// Panorama-frame ray through pixel `(x, y)`.
    pub fn image_to_pano_ray(&self, x: f64, y: f64) -> Option<Vector3<f64>> {
        let cam = self.image_to_camera_ray(x, y)?;
        Some(self.camera_from_pano().inverse() * cam)
    }

    /// Pixel hit by a panorama-frame ray.
    pub fn pano_ray_to_image(&self, ray: &Vector3<f64>) -> Option<[f64; 2]> {
        self.camera_ray_to_image(&(self.camera_from_pano() * ray))
    }
}

/// `Rz(roll) · Rx(−pitch) · Ry(−yaw)` from angles in degrees.
pub fn orientation(yaw_deg: f64, pitch_deg: f64, roll_deg: f64) -> Rotation3<f64> {
    Rotation3::from_axis_angle(&Vector3::z_axis(), roll_deg.to_radians())
        * Rotation3::from_axis_angle(&Vector3::x_axis(), -pitch_deg.to_radians())
        * Rotation3::from_axis_angle(&Vector3::y_axis(), -yaw_deg.to_radians())
}

/// Physical focal length (mm) for a projection, field of view, crop factor
/// and image size.
///
/// The sensor diagonal is `43.27 / crop` mm, split into width and height by
/// the image aspect ratio.
pub fn calc_focal_length(
    projection: Projection,
    hfov_deg: f64,
    crop_factor: f64,
    width: usize,
    height: usize,
) -> f64 {
    if width == 0 || height == 0 || crop_factor <= 0.0 || hfov_deg <= 0.0 {
        return 0.0;
    }
    let diagonal = FULL_FRAME_DIAGONAL_MM / crop_factor;
    let ratio = width as f64 / height as f64;
    let sensor_width = diagonal / (1.0 + 1.0 / (ratio * ratio)).sqrt();
    let focal_px = projection.focal_from_hfov(hfov_deg.to_radians(), width as f64);
    focal_px * sensor_width / width as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn full_frame_rectilinear_focal_length() {
        // 36 mm wide sensor, 90° hfov -> 18 mm.
        let f = calc_focal_length(Projection::Rectilinear, 90.0, 1.0, 3000, 2000);
        assert_relative_eq!(f, 18.0, epsilon = 1e-9);
    }

    #[test]
    fn crop_factor_shrinks_sensor() {
        let ff = calc_focal_length(Projection::Rectilinear, 60.0, 1.0, 3000, 2000);
        let aps = calc_focal_length(Projection::Rectilinear, 60.0, 1.5, 3000, 2000);
        assert_relative_eq!(ff / aps, 1.5, epsilon = 1e-9);
    }

    #[test]
    fn exif_focal_length_takes_precedence() {
        let mut img = SrcImage::new(3000, 2000, Projection::Rectilinear, 90.0);
        img.exif_focal_length_mm = 35.0;
        assert_eq!(img.focal_length_mm(), 35.0);
        img.exif_focal_length_mm = 0.0;
        assert_relative_eq!(img.focal_length_mm(), 18.0, epsilon = 1e-9);
    }

    #[test]
    fn pitch_up_moves_horizon_down() {
        let mut img = SrcImage::new(1000, 800, Projection::Rectilinear, 90.0);
        img.pitch_deg = 10.0;
        let horizon = Vector3::new(0.0, 0.0, 1.0);
        let p = img.pano_ray_to_image(&horizon).expect("visible");
        assert!(p[1] > 400.0, "horizon at y={}", p[1]);
        assert_relative_eq!(p[0], 500.0, epsilon = 1e-9);
    }

    #[test]
    fn roll_tilts_world_vertical() {
        let mut img = SrcImage::new(1000, 1000, Projection::Rectilinear, 90.0);
        img.roll_deg = 10.0;
        let top = img
            .pano_ray_to_image(&Vector3::new(0.0, -0.2, 1.0))
            .expect("visible");
        let bottom = img
            .pano_ray_to_image(&Vector3::new(0.0, 0.2, 1.0))
            .expect("visible");
        let dx = bottom[0] - top[0];
        let dy = bottom[1] - top[1];
        let r = 10f64.to_radians();
        assert!(crate::angle::vertical_deviation(dx, dy, 10.0) < 1e-9);
        assert_relative_eq!(dx / dy, -r.sin() / r.cos(), epsilon = 1e-9);
    }

    #[test]
    fn pixel_round_trip_through_panorama() {
        let mut img = SrcImage::new(1200, 900, Projection::FullFrameFisheye, 150.0);
        img.yaw_deg = 20.0;
        img.pitch_deg = -5.0;
        img.roll_deg = 3.0;
        let ray = img.image_to_pano_ray(100.0, 700.0).expect("ray");
        let back = img.pano_ray_to_image(&ray).expect("pixel");
        assert_relative_eq!(back[0], 100.0, epsilon = 1e-7);
        assert_relative_eq!(back[1], 700.0, epsilon = 1e-7);
    }
}
