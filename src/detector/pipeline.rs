//! End-to-end vertical line detection for one image of a panorama.
//!
//! Stages
//! - Edges: rectilinear images are bounded to `max_dim` and edge-detected
//!   directly; every other projection is first remapped onto an
//!   equirectangular canvas and detected there at full canvas resolution.
//! - Lines: trace raw chains, then fit and filter near-vertical candidates.
//! - Control points: map endpoints back to the original image.
//! - Validation: optimise pitch/roll on a throwaway panorama and keep the
//!   best `nr_lines` candidates.
//!
//! ```no_run
//! use std::sync::Arc;
//! use vertical_lines::prelude::*;
//!
//! # fn example(pano: &Panorama, gray: ImageU8) -> Result<(), DetectError> {
//! let detector = VerticalLineDetector::new(
//!     VerticalLineParams::default(),
//!     Arc::new(SharedOptimizer::default()),
//! );
//! let cps = detector.detect(pano, 0, gray.into(), None, 5)?;
//! println!("{} vertical lines", cps.len());
//! # Ok(())
//! # }
//! ```

use super::params::VerticalLineParams;
use super::synth::{synthesize, EndpointMap};
use super::validate::Validation;
use super::DetectError;
use crate::diagnostics::DetectionReport;
use crate::edges::{detect_edges, EdgeMask};
use crate::image::{ImageF32, ImageU8, SourceImage};
use crate::lens::SrcImage;
use crate::lines::{filter_lines, find_lines};
use crate::optimize::SharedOptimizer;
use crate::panorama::{ControlPoint, Panorama};
use crate::remap::{remap_to_equirect, BorderFit, PanoramaFit, RemapContext};
use log::debug;
use rayon::prelude::*;
use std::sync::Arc;
use std::time::Instant;

/// One image of a [`VerticalLineDetector::detect_batch`] call.
#[derive(Clone, Copy, Debug)]
pub struct DetectJob<'a> {
    pub image_index: usize,
    pub image: SourceImage<'a>,
    pub mask: Option<ImageU8<'a>>,
    pub nr_lines: usize,
}

/// Finds vertical lines in panorama images and turns them into `X` control
/// points.
pub struct VerticalLineDetector {
    params: VerticalLineParams,
    optimizer: Arc<SharedOptimizer>,
    fit: Box<dyn PanoramaFit + Send + Sync>,
}

struct EdgeStage {
    edge: EdgeMask,
    remap: Option<RemapContext>,
}

impl VerticalLineDetector {
    pub fn new(params: VerticalLineParams, optimizer: Arc<SharedOptimizer>) -> Self {
        Self {
            params,
            optimizer,
            fit: Box::new(BorderFit::default()),
        }
    }

    /// Replace the canvas fit used for non-rectilinear images.
    pub fn with_fit(mut self, fit: impl PanoramaFit + Send + Sync + 'static) -> Self {
        self.fit = Box::new(fit);
        self
    }

    pub fn params(&self) -> &VerticalLineParams {
        &self.params
    }

    pub fn set_params(&mut self, params: VerticalLineParams) {
        self.params = params;
    }

    /// Vertical-line control points for image `image_index` of `pano`, at
    /// most `nr_lines`, best first, all with error 0.
    pub fn detect(
        &self,
        pano: &Panorama,
        image_index: usize,
        image: SourceImage<'_>,
        mask: Option<ImageU8<'_>>,
        nr_lines: usize,
    ) -> Result<Vec<ControlPoint>, DetectError> {
        self.detect_with_report(pano, image_index, image, mask, nr_lines)
            .map(|report| report.control_points)
    }

    /// Run independent images in parallel. Optimizer calls are serialised.
    pub fn detect_batch(
        &self,
        pano: &Panorama,
        jobs: &[DetectJob<'_>],
    ) -> Vec<Result<Vec<ControlPoint>, DetectError>> {
        jobs.par_iter()
            .map(|job| self.detect(pano, job.image_index, job.image, job.mask, job.nr_lines))
            .collect()
    }

    /// Like [`detect`](Self::detect), returning stage counts, rejections and
    /// timings alongside the control points.
    pub fn detect_with_report(
        &self,
        pano: &Panorama,
        image_index: usize,
        image: SourceImage<'_>,
        mask: Option<ImageU8<'_>>,
        nr_lines: usize,
    ) -> Result<DetectionReport, DetectError> {
        let total_start = Instant::now();
        let lens = check_inputs(pano, image_index, &image, mask.as_ref())?;
        let mut report = DetectionReport::new(image_index);
        let remapped = !lens.is_rectilinear();
        let roll = if remapped { 0.0 } else { lens.roll_deg };
        report.remapped = remapped;

        let stage_start = Instant::now();
        let gray = image.to_gray_f32();
        let Some(EdgeStage { edge, remap }) = self.edge_stage(lens, &gray, mask.as_ref()) else {
            debug!(
                "VerticalLineDetector::detect image={} no remap canvas",
                image_index
            );
            report.timing.total_ms = total_start.elapsed().as_secs_f64() * 1000.0;
            return Ok(report);
        };
        drop(gray);
        report.timing.record_since("edges", stage_start);
        report.working_size = [edge.width(), edge.height()];
        report.inv_scale = edge.inv_scale;
        report.counts.edge_pixels = edge.edge_count();
        let inv_scale = edge.inv_scale;

        let stage_start = Instant::now();
        let raw = find_lines(
            edge,
            self.params.length_threshold,
            lens.focal_length_mm(),
            lens.crop_factor,
            &self.params.trace,
        );
        report.counts.raw_lines = raw.len();
        report.counts.valid_raw_lines = raw.iter().filter(|l| l.is_valid()).count();
        let fitted = filter_lines(&raw, roll, &self.params.filter);
        report.counts.fitted_lines = fitted.len();
        report.timing.record_since("lines", stage_start);

        let stage_start = Instant::now();
        let map = match &remap {
            Some(ctx) => EndpointMap::Remap(ctx),
            None => EndpointMap::Scale(inv_scale),
        };
        let candidates = synthesize(
            &fitted,
            map,
            image.width(),
            image.height(),
            image_index,
            &mut report.rejections,
        );
        report.counts.candidates = candidates.len();
        report.timing.record_since("control_points", stage_start);

        let stage_start = Instant::now();
        let validation = Validation {
            lens,
            image: image_index,
            roll_deg: roll,
            nr_lines,
            params: &self.params,
        };
        report.control_points = validation.run(
            candidates,
            &self.optimizer,
            &mut report.validation,
            &mut report.rejections,
        );
        report.counts.validated = report.control_points.len();
        report.timing.record_since("validation", stage_start);

        report.timing.total_ms = total_start.elapsed().as_secs_f64() * 1000.0;
        debug!(
            "VerticalLineDetector::detect image={} remapped={} edges={} raw={} fitted={} candidates={} cps={} total_ms={:.3}",
            image_index,
            remapped,
            report.counts.edge_pixels,
            report.counts.raw_lines,
            report.counts.fitted_lines,
            report.counts.candidates,
            report.counts.validated,
            report.timing.total_ms
        );
        Ok(report)
    }

    fn edge_stage(
        &self,
        lens: &SrcImage,
        gray: &ImageF32,
        mask: Option<&ImageU8<'_>>,
    ) -> Option<EdgeStage> {
        let p = &self.params;
        if lens.is_rectilinear() {
            let mut edge = detect_edges(gray, p.edge_scale, p.edge_threshold, p.max_dim);
            if let Some(m) = mask {
                edge.apply_mask(m);
            }
            return Some(EdgeStage { edge, remap: None });
        }
        let ctx = remap_to_equirect(lens, gray, mask, &p.remap_settings(), self.fit.as_ref())?;
        let max_dim = ctx.width().max(ctx.height()) + p.remap_margin;
        let mut edge = detect_edges(&ctx.image, p.edge_scale, p.edge_threshold, max_dim);
        edge.apply_mask(&ctx.mask.as_view());
        Some(EdgeStage {
            edge,
            remap: Some(ctx),
        })
    }
}

fn check_inputs<'p>(
    pano: &'p Panorama,
    image_index: usize,
    image: &SourceImage<'_>,
    mask: Option<&ImageU8<'_>>,
) -> Result<&'p SrcImage, DetectError> {
    let lens = pano
        .image(image_index)
        .ok_or(DetectError::ImageIndexOutOfRange {
            index: image_index,
            count: pano.images().len(),
        })?;
    if !image.is_well_formed() {
        return Err(DetectError::MalformedRaster);
    }
    let raster = [image.width(), image.height()];
    if raster != [lens.width, lens.height] {
        return Err(DetectError::RasterSizeMismatch {
            index: image_index,
            expected: [lens.width, lens.height],
            actual: raster,
        });
    }
    if let Some(m) = mask {
        if !m.is_well_formed() {
            return Err(DetectError::MalformedRaster);
        }
        if [m.w, m.h] != raster {
            return Err(DetectError::MaskSizeMismatch {
                mask: [m.w, m.h],
                raster,
            });
        }
    }
    Ok(lens)
}
