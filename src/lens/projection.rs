//! Per-projection mapping between image-plane offsets and camera rays.
//!
//! Camera frame: x right, y down, z forward. Offsets are measured from the
//! optical centre in pixels; `f` is the focal length in pixels.
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};

const EPS: f64 = 1e-12;

/// Lens projection of a source image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Projection {
    Rectilinear,
    /// Cylindrical: equidistant horizontally, perspective vertically.
    Panoramic,
    CircularFisheye,
    FullFrameFisheye,
    Equirectangular,
    FisheyeOrthographic,
    FisheyeStereographic,
    FisheyeEquisolid,
}

impl Projection {
    /// Focal length in pixels for an image `width` pixels wide covering
    /// `hfov` radians.
    pub fn focal_from_hfov(self, hfov: f64, width: f64) -> f64 {
        let half_w = 0.5 * width;
        let a = 0.5 * hfov;
        match self {
            Projection::Rectilinear => half_w / a.tan(),
            Projection::CircularFisheye | Projection::FullFrameFisheye => half_w / a,
            Projection::FisheyeStereographic => half_w / (2.0 * (0.5 * a).tan()),
            Projection::FisheyeEquisolid => half_w / (2.0 * (0.5 * a).sin()),
            Projection::FisheyeOrthographic => half_w / a.min(FRAC_PI_2).sin(),
            Projection::Equirectangular | Projection::Panoramic => width / hfov,
        }
    }

    /// Unit ray for the offset `(dx, dy)` from the optical centre.
    pub fn offset_to_ray(self, dx: f64, dy: f64, f: f64) -> Option<Vector3<f64>> {
        if !(dx.is_finite() && dy.is_finite() && f > 0.0) {
            return None;
        }
        match self {
            Projection::Rectilinear => Some(Vector3::new(dx, dy, f).normalize()),
            Projection::Equirectangular => {
                let lon = dx / f;
                let lat = dy / f;
                if lon.abs() > PI || lat.abs() > FRAC_PI_2 {
                    return None;
                }
                Some(Vector3::new(
                    lat.cos() * lon.sin(),
                    lat.sin(),
                    lat.cos() * lon.cos(),
                ))
            }
            Projection::Panoramic => {
                let lon = dx / f;
                if lon.abs() > PI {
                    return None;
                }
                Some(Vector3::new(lon.sin(), dy / f, lon.cos()).normalize())
            }
            _ => {
                let r = (dx * dx + dy * dy).sqrt();
                if r < EPS {
                    return Some(Vector3::z());
                }
                let theta = self.radial_angle(r / f)?;
                let s = theta.sin();
                Some(Vector3::new(s * dx / r, s * dy / r, theta.cos()))
            }
        }
    }

    /// Offset from the optical centre for a camera ray.
    pub fn ray_to_offset(self, ray: &Vector3<f64>, f: f64) -> Option<[f64; 2]> {
        let norm = ray.norm();
        if !(norm > EPS && f > 0.0) {
            return None;
        }
        let r = ray / norm;
        match self {
            Projection::Rectilinear => {
                if r.z <= EPS {
                    return None;
                }
                Some([f * r.x / r.z, f * r.y / r.z])
            }
            Projection::Equirectangular => {
                let lon = r.x.atan2(r.z);
                let lat = r.y.clamp(-1.0, 1.0).asin();
                Some([f * lon, f * lat])
            }
            Projection::Panoramic => {
                let horiz = (r.x * r.x + r.z * r.z).sqrt();
                if horiz < EPS {
                    return None;
                }
                Some([f * r.x.atan2(r.z), f * r.y / horiz])
            }
            _ => {
                let theta = r.z.clamp(-1.0, 1.0).acos();
                let rho = f * self.radial_distance(theta)?;
                let planar = (r.x * r.x + r.y * r.y).sqrt();
                if planar < EPS {
                    return Some([0.0, 0.0]);
                }
                Some([rho * r.x / planar, rho * r.y / planar])
            }
        }
    }

    /// Angle from the optical axis for a normalised radius `r / f`.
    fn radial_angle(self, rn: f64) -> Option<f64> {
        let theta = match self {
            Projection::CircularFisheye | Projection::FullFrameFisheye => rn,
            Projection::FisheyeStereographic => 2.0 * (0.5 * rn).atan(),
            Projection::FisheyeEquisolid => {
                let s = 0.5 * rn;
                if s > 1.0 {
                    return None;
                }
                2.0 * s.asin()
            }
            Projection::FisheyeOrthographic => {
                if rn > 1.0 {
                    return None;
                }
                rn.asin()
            }
            _ => return None,
        };
        (theta <= PI).then_some(theta)
    }

    /// Normalised radius `r / f` for an angle from the optical axis.
    fn radial_distance(self, theta: f64) -> Option<f64> {
        match self {
            Projection::CircularFisheye | Projection::FullFrameFisheye => Some(theta),
            Projection::FisheyeStereographic => {
                (theta < PI - 1e-9).then(|| 2.0 * (0.5 * theta).tan())
            }
            Projection::FisheyeEquisolid => Some(2.0 * (0.5 * theta).sin()),
            Projection::FisheyeOrthographic => (theta <= FRAC_PI_2).then(|| theta.sin()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Projection; 8] = [
        Projection::Rectilinear,
        Projection::Panoramic,
        Projection::CircularFisheye,
        Projection::FullFrameFisheye,
        Projection::Equirectangular,
        Projection::FisheyeOrthographic,
        Projection::FisheyeStereographic,
        Projection::FisheyeEquisolid,
    ];

    #[test]
    fn offsets_round_trip_through_rays() {
        let f = 500.0;
        for proj in ALL {
            for &(dx, dy) in &[(0.0, 0.0), (120.0, -40.0), (-200.0, 150.0), (10.0, 300.0)] {
                let ray = proj
                    .offset_to_ray(dx, dy, f)
                    .unwrap_or_else(|| panic!("{proj:?} ({dx},{dy}) has no ray"));
                let back = proj.ray_to_offset(&ray, f).expect("inverse exists");
                assert!(
                    (back[0] - dx).abs() < 1e-6 && (back[1] - dy).abs() < 1e-6,
                    "{proj:?}: ({dx},{dy}) -> {back:?}"
                );
            }
        }
    }

    #[test]
    fn image_edge_matches_half_hfov() {
        let hfov = 100f64.to_radians();
        let width = 1000.0;
        for proj in ALL {
            let f = proj.focal_from_hfov(hfov, width);
            let ray = proj.offset_to_ray(0.5 * width, 0.0, f).expect("edge ray");
            let angle = ray.x.atan2(ray.z);
            assert!(
                (angle - 0.5 * hfov).abs() < 1e-9,
                "{proj:?}: edge at {} deg",
                angle.to_degrees()
            );
        }
    }

    #[test]
    fn rectilinear_rejects_rays_behind_camera() {
        let ray = Vector3::new(0.0, 0.0, -1.0);
        assert!(Projection::Rectilinear.ray_to_offset(&ray, 100.0).is_none());
    }

    #[test]
    fn orthographic_domain_is_bounded() {
        assert!(Projection::FisheyeOrthographic
            .offset_to_ray(150.0, 0.0, 100.0)
            .is_none());
    }
}
