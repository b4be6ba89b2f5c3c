use super::residuals::control_point_errors;
use super::{OptimizeError, OptimizeReport, Optimizer};
use crate::lens::SrcImage;
use crate::panorama::{ControlPoint, ImageVariable, Panorama};
use levenberg_marquardt::{LeastSquaresProblem, LevenbergMarquardt};
use log::debug;
use nalgebra::{storage::Owned, DMatrix, DVector, Dyn};
use serde::{Deserialize, Serialize};

/// Levenberg-Marquardt over the yaw, pitch and roll variables listed in the
/// panorama's optimize vector. Angles are solved in degrees; the Jacobian is
/// taken by central differences.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PitchRollOptimizer {
    pub ftol: f64,
    pub xtol: f64,
    pub gtol: f64,
    pub patience: usize,
    /// Finite-difference step in degrees.
    pub step_deg: f64,
}

impl Default for PitchRollOptimizer {
    fn default() -> Self {
        Self {
            ftol: 1e-12,
            xtol: 1e-12,
            gtol: 1e-12,
            patience: 100,
            step_deg: 1e-4,
        }
    }
}

type Layout = Vec<(usize, ImageVariable)>;

fn variable_mut(img: &mut SrcImage, var: ImageVariable) -> &mut f64 {
    match var {
        ImageVariable::Yaw => &mut img.yaw_deg,
        ImageVariable::Pitch => &mut img.pitch_deg,
        ImageVariable::Roll => &mut img.roll_deg,
    }
}

fn variable(img: &SrcImage, var: ImageVariable) -> f64 {
    match var {
        ImageVariable::Yaw => img.yaw_deg,
        ImageVariable::Pitch => img.pitch_deg,
        ImageVariable::Roll => img.roll_deg,
    }
}

fn apply(images: &mut [SrcImage], layout: &Layout, params: &DVector<f64>) {
    for (k, &(i, var)) in layout.iter().enumerate() {
        *variable_mut(&mut images[i], var) = params[k];
    }
}

struct OrientationProblem<'a> {
    images: Vec<SrcImage>,
    points: &'a [ControlPoint],
    layout: &'a Layout,
    params: DVector<f64>,
    step: f64,
}

impl OrientationProblem<'_> {
    fn residuals_at(&self, params: &DVector<f64>) -> Option<DVector<f64>> {
        let mut images = self.images.clone();
        apply(&mut images, self.layout, params);
        let errs = control_point_errors(&images, self.points).ok()?;
        errs.iter()
            .all(|e| e.is_finite())
            .then(|| DVector::from_vec(errs))
    }
}

impl LeastSquaresProblem<f64, Dyn, Dyn> for OrientationProblem<'_> {
    type ResidualStorage = Owned<f64, Dyn>;
    type JacobianStorage = Owned<f64, Dyn, Dyn>;
    type ParameterStorage = Owned<f64, Dyn>;

    fn set_params(&mut self, x: &DVector<f64>) {
        self.params.clone_from(x);
    }

    fn params(&self) -> DVector<f64> {
        self.params.clone()
    }

    fn residuals(&self) -> Option<DVector<f64>> {
        self.residuals_at(&self.params)
    }

    fn jacobian(&self) -> Option<DMatrix<f64>> {
        let n = self.params.len();
        let m = self.points.len();
        let mut jac = DMatrix::zeros(m, n);
        for k in 0..n {
            let mut plus = self.params.clone();
            let mut minus = self.params.clone();
            plus[k] += self.step;
            minus[k] -= self.step;
            let rp = self.residuals_at(&plus)?;
            let rm = self.residuals_at(&minus)?;
            jac.set_column(k, &((rp - rm) / (2.0 * self.step)));
        }
        Some(jac)
    }
}

impl Optimizer for PitchRollOptimizer {
    fn optimize(&mut self, pano: &mut Panorama) -> Result<OptimizeReport, OptimizeError> {
        if pano.control_points().is_empty() {
            return Err(OptimizeError::NoControlPoints);
        }
        let layout: Layout = pano
            .optimize_vector()
            .iter()
            .enumerate()
            .filter(|(i, _)| *i < pano.images().len())
            .flat_map(|(i, vars)| vars.iter().map(move |&v| (i, v)))
            .collect();

        if pano.control_points().len() < layout.len() {
            return Err(OptimizeError::Underdetermined {
                residuals: pano.control_points().len(),
                variables: layout.len(),
            });
        }

        let initial = control_point_errors(pano.images(), pano.control_points())?;
        let initial_cost = 0.5 * initial.iter().map(|e| e * e).sum::<f64>();

        let mut report = OptimizeReport {
            evaluations: 0,
            initial_cost,
            final_cost: initial_cost,
            converged: true,
        };

        if !layout.is_empty() {
            let x0 = DVector::from_iterator(
                layout.len(),
                layout.iter().map(|&(i, v)| variable(&pano.images()[i], v)),
            );
            let problem = OrientationProblem {
                images: pano.images().to_vec(),
                points: pano.control_points(),
                layout: &layout,
                params: x0,
                step: self.step_deg,
            };
            let lm = LevenbergMarquardt::new()
                .with_ftol(self.ftol)
                .with_xtol(self.xtol)
                .with_gtol(self.gtol)
                .with_patience(self.patience.max(1));
            let (problem, lm_report) = lm.minimize(problem);
            if !lm_report.objective_function.is_finite() {
                return Err(OptimizeError::SolverFailed(format!(
                    "{:?}",
                    lm_report.termination
                )));
            }
            let params = problem.params();
            let mut images = pano.images().to_vec();
            apply(&mut images, &layout, &params);
            for (i, img) in images.into_iter().enumerate() {
                if let Some(slot) = pano.image_mut(i) {
                    *slot = img;
                }
            }
            report.evaluations = lm_report.number_of_evaluations;
            report.converged = lm_report.termination.was_successful();
        }

        let errors = control_point_errors(pano.images(), pano.control_points())?;
        report.final_cost = 0.5 * errors.iter().map(|e| e * e).sum::<f64>();
        for (cp, e) in pano.control_points_mut().iter_mut().zip(errors) {
            cp.error = e.abs();
        }
        debug!(
            "PitchRollOptimizer::optimize vars={} cps={} cost {:.4} -> {:.4} evals={} converged={}",
            layout.len(),
            pano.control_points().len(),
            report.initial_cost,
            report.final_cost,
            report.evaluations,
            report.converged
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lens::{Projection, SrcImage};
    use approx::assert_relative_eq;
    use nalgebra::Vector3;
    use std::collections::BTreeSet;

    fn pano_ray(lon_deg: f64, lat_deg: f64) -> Vector3<f64> {
        let (lon, lat) = (lon_deg.to_radians(), lat_deg.to_radians());
        Vector3::new(lat.cos() * lon.sin(), lat.sin(), lat.cos() * lon.cos())
    }

    #[test]
    fn recovers_pitch_and_roll_from_vertical_lines() {
        let mut truth = SrcImage::new(1200, 900, Projection::Rectilinear, 70.0);
        truth.pitch_deg = 5.0;
        truth.roll_deg = 2.0;

        let mut pano = Panorama::new();
        pano.add_image(SrcImage::new(1200, 900, Projection::Rectilinear, 70.0));
        for lon in [-25.0, -10.0, 12.0, 28.0] {
            let p1 = truth.pano_ray_to_image(&pano_ray(lon, -15.0)).unwrap();
            let p2 = truth.pano_ray_to_image(&pano_ray(lon, 18.0)).unwrap();
            pano.add_control_point(ControlPoint::vertical(0, p1, p2));
        }
        pano.set_optimize_vector(vec![BTreeSet::from([ImageVariable::Pitch, ImageVariable::Roll])]);

        let report = PitchRollOptimizer::default().optimize(&mut pano).unwrap();
        assert!(report.final_cost < report.initial_cost);
        let img = pano.image(0).unwrap();
        assert_relative_eq!(img.pitch_deg, 5.0, epsilon = 1e-3);
        assert_relative_eq!(img.roll_deg, 2.0, epsilon = 1e-3);
        assert!(pano.control_points().iter().all(|cp| cp.error < 1e-2));
    }

    #[test]
    fn empty_panorama_is_an_error() {
        let mut pano = Panorama::new();
        pano.add_image(SrcImage::default());
        assert!(matches!(
            PitchRollOptimizer::default().optimize(&mut pano),
            Err(OptimizeError::NoControlPoints)
        ));
    }

    #[test]
    fn no_free_variables_only_measures() {
        let mut pano = Panorama::new();
        pano.add_image(SrcImage::new(1000, 800, Projection::Rectilinear, 60.0));
        pano.add_control_point(ControlPoint::vertical(0, [500.0, 100.0], [520.0, 700.0]));
        let report = PitchRollOptimizer::default().optimize(&mut pano).unwrap();
        assert_eq!(report.evaluations, 0);
        assert!(pano.control_points()[0].error > 0.0);
    }
}
