use super::OptimizeError;
use crate::angle::wrap_pi;
use crate::lens::SrcImage;
use crate::panorama::{ControlPoint, CpMode};
use nalgebra::{Matrix3, SymmetricEigen, Vector3};
use std::collections::HashMap;

fn ray(images: &[SrcImage], cp_index: usize, image: usize, p: [f64; 2]) -> Result<Vector3<f64>, OptimizeError> {
    let img = images.get(image).ok_or(OptimizeError::InvalidImageIndex {
        cp: cp_index,
        image,
        count: images.len(),
    })?;
    img.image_to_pano_ray(p[0], p[1])
        .ok_or(OptimizeError::InvalidGeometry(cp_index))
}

#[inline]
fn longitude(r: &Vector3<f64>) -> f64 {
    r.x.atan2(r.z)
}

#[inline]
fn latitude(r: &Vector3<f64>) -> f64 {
    r.y.clamp(-1.0, 1.0).asin()
}

/// Normal of the great circle best fitting `rays`.
fn great_circle_normal(rays: &[Vector3<f64>]) -> Vector3<f64> {
    let m: Matrix3<f64> = rays.iter().map(|r| r * r.transpose()).sum();
    let eig = SymmetricEigen::new(m);
    let k = eig.eigenvalues.imin();
    eig.eigenvectors.column(k).into_owned()
}

/// Angular error of one control point in radians. `Line` points need the
/// normal of their line's great circle.
pub fn control_point_error(
    cp: &ControlPoint,
    r1: &Vector3<f64>,
    r2: &Vector3<f64>,
    line_normal: Option<&Vector3<f64>>,
) -> f64 {
    match cp.mode {
        CpMode::X => wrap_pi(longitude(r1) - longitude(r2)),
        CpMode::Y => latitude(r1) - latitude(r2),
        CpMode::Normal => r1.cross(r2).norm().atan2(r1.dot(r2)),
        CpMode::Line(_) => match line_normal {
            Some(n) => {
                let d1 = n.dot(r1).clamp(-1.0, 1.0).asin();
                let d2 = n.dot(r2).clamp(-1.0, 1.0).asin();
                d1.hypot(d2)
            }
            None => 0.0,
        },
    }
}

/// Signed residual per control point in pixels (angle × focal length of the
/// first image).
pub fn control_point_errors(
    images: &[SrcImage],
    points: &[ControlPoint],
) -> Result<Vec<f64>, OptimizeError> {
    let mut rays = Vec::with_capacity(points.len());
    for (i, cp) in points.iter().enumerate() {
        rays.push((ray(images, i, cp.image1, cp.p1)?, ray(images, i, cp.image2, cp.p2)?));
    }

    let mut line_rays: HashMap<u32, Vec<Vector3<f64>>> = HashMap::new();
    for (cp, (r1, r2)) in points.iter().zip(&rays) {
        if let CpMode::Line(id) = cp.mode {
            let entry = line_rays.entry(id).or_default();
            entry.push(*r1);
            entry.push(*r2);
        }
    }
    let normals: HashMap<u32, Vector3<f64>> = line_rays
        .into_iter()
        .map(|(id, rs)| (id, great_circle_normal(&rs)))
        .collect();

    Ok(points
        .iter()
        .zip(&rays)
        .map(|(cp, (r1, r2))| {
            let normal = match cp.mode {
                CpMode::Line(id) => normals.get(&id),
                _ => None,
            };
            let focal = images[cp.image1].focal_px();
            control_point_error(cp, r1, r2, normal) * focal
        })
        .collect())
}
