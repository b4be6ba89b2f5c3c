//! Statistical validation of vertical-line candidates.
//!
//! Two or more candidates are optimised together on a throwaway single-image
//! panorama (pitch and roll free). Candidates whose residual exceeds
//! `mean + σ` are dropped; the rest are ranked by
//! `error / max_error + (1 − min(length, cap) / cap)` and the best
//! `nr_lines` kept. Without a positive residual among the survivors there is
//! nothing to rank and no point is returned. A single candidate only passes
//! a tighter verticality test against the known roll.

use super::params::VerticalLineParams;
use crate::angle::vertical_deviation;
use crate::diagnostics::{Rejection, RejectionCounts, ValidationReport};
use crate::lens::SrcImage;
use crate::optimize::SharedOptimizer;
use crate::panorama::{ControlPoint, ImageVariable, Panorama, PanoramaOptions};
use log::{debug, warn};
use std::collections::BTreeSet;

pub struct Validation<'a> {
    pub lens: &'a SrcImage,
    pub image: usize,
    pub roll_deg: f64,
    pub nr_lines: usize,
    pub params: &'a VerticalLineParams,
}

impl Validation<'_> {
    pub fn run(
        &self,
        candidates: Vec<ControlPoint>,
        optimizer: &SharedOptimizer,
        report: &mut ValidationReport,
        rejections: &mut RejectionCounts,
    ) -> Vec<ControlPoint> {
        match candidates.len() {
            0 => Vec::new(),
            1 => self.single(candidates),
            _ => self.multiple(candidates, optimizer, report, rejections),
        }
    }

    fn single(&self, candidates: Vec<ControlPoint>) -> Vec<ControlPoint> {
        candidates
            .into_iter()
            .filter(|cp| {
                let dev = vertical_deviation(
                    cp.p2[0] - cp.p1[0],
                    cp.p2[1] - cp.p1[1],
                    self.roll_deg,
                );
                debug!("Validation::single deviation={:.4}", dev);
                dev < self.params.single_line_max_deviation
            })
            .map(|cp| self.finish(cp))
            .collect()
    }

    fn multiple(
        &self,
        candidates: Vec<ControlPoint>,
        optimizer: &SharedOptimizer,
        report: &mut ValidationReport,
        rejections: &mut RejectionCounts,
    ) -> Vec<ControlPoint> {
        let mut pano = Panorama::new();
        pano.add_image(self.lens.with_orientation_zeroed());
        for mut cp in candidates {
            cp.image1 = 0;
            cp.image2 = 0;
            pano.add_control_point(cp);
        }
        pano.set_options(PanoramaOptions::equirectangular(self.params.max_dim));
        pano.set_optimize_vector(vec![BTreeSet::from([
            ImageVariable::Pitch,
            ImageVariable::Roll,
        ])]);

        match optimizer.run(&mut pano) {
            Ok(opt) => report.optimizer = Some(opt),
            Err(err) => {
                warn!(
                    "Validation: optimizer failed for image {}: {}",
                    self.image, err
                );
                return Vec::new();
            }
        }

        let Some(stats) = pano.error_stats() else {
            return Vec::new();
        };
        let limit = stats.outlier_limit();
        report.error_stats = Some(stats);
        report.outlier_limit = Some(limit);

        let mut kept: Vec<ControlPoint> = Vec::new();
        for cp in pano.take_control_points() {
            if cp.error > limit {
                rejections.record(Rejection::ResidualOutlier);
            } else {
                kept.push(cp);
            }
        }
        let max_error = kept.iter().map(|cp| cp.error).fold(0.0, f64::max);
        if kept.is_empty() || max_error <= 0.0 {
            debug!(
                "Validation::multiple image={} max_error={} leaves nothing to rank",
                self.image, max_error
            );
            return Vec::new();
        }
        let cap = self.params.merit_length_cap;
        for cp in &mut kept {
            cp.error = cp.error / max_error + (1.0 - cp.length().min(cap) / cap);
        }
        kept.sort_by(|a, b| a.error.total_cmp(&b.error));
        debug!(
            "Validation::multiple mean={:.4} limit={:.4} kept={} max_error={:.4}",
            stats.mean,
            limit,
            kept.len(),
            max_error
        );
        kept.into_iter()
            .take(self.nr_lines)
            .map(|cp| self.finish(cp))
            .collect()
    }

    fn finish(&self, mut cp: ControlPoint) -> ControlPoint {
        cp.image1 = self.image;
        cp.image2 = self.image;
        cp.error = 0.0;
        cp
    }
}
