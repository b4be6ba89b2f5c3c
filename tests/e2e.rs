mod common;

use approx::assert_abs_diff_eq;
use common::synthetic_image::{slanted_stripes_u8, vertical_step_u8, vertical_stripes_u8};
use std::sync::Arc;
use vertical_lines::detector::DetectJob;
use vertical_lines::image::ImageU8;
use vertical_lines::lens::{Projection, SrcImage};
use vertical_lines::optimize::{OptimizeError, OptimizeReport};
use vertical_lines::{
    CpMode, DetectError, Optimizer, Panorama, SharedOptimizer, VerticalLineDetector,
    VerticalLineParams,
};

fn detector() -> VerticalLineDetector {
    VerticalLineDetector::new(
        VerticalLineParams::default(),
        Arc::new(SharedOptimizer::default()),
    )
}

fn pano_with(width: usize, height: usize) -> Panorama {
    let mut pano = Panorama::new();
    pano.add_image(SrcImage::new(width, height, Projection::Rectilinear, 60.0));
    pano
}

fn stripes() -> Vec<(usize, usize)> {
    vec![(60, 80), (160, 180), (260, 280), (360, 380)]
}

#[test]
fn isolated_vertical_edge_yields_one_control_point() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (w, h) = (300, 200);
    let buffer = vertical_step_u8(w, h, 150);
    let pano = pano_with(w, h);

    let report = detector()
        .detect_with_report(&pano, 0, ImageU8::packed(w, h, &buffer).into(), None, 5)
        .unwrap();

    assert!(!report.remapped);
    assert_eq!(report.inv_scale, 1.0);
    assert_eq!(report.counts.fitted_lines, 1);
    assert_eq!(report.control_points.len(), 1);
    let cp = &report.control_points[0];
    assert_eq!(cp.mode, CpMode::X);
    assert_eq!((cp.image1, cp.image2), (0, 0));
    assert_eq!(cp.error, 0.0);
    assert_abs_diff_eq!(cp.p1[0], 149.5, epsilon = 1.0);
    assert_eq!(cp.p1[0], cp.p2[0]);
    assert!(cp.length() > 180.0, "length = {}", cp.length());
    let stages: Vec<&str> = report.timing.stages.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(stages, ["edges", "lines", "control_points", "validation"]);
}

#[test]
fn stripes_give_at_most_nr_lines_in_bounds() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (w, h) = (480, 300);
    // four verticals and a stripe leaning 0.08 px per row
    let mut layout: Vec<(f64, f64, f64)> = stripes()
        .into_iter()
        .map(|(x0, x1)| (x0 as f64, x1 as f64, 0.0))
        .collect();
    layout.push((420.0, 435.0, 0.08));
    let buffer = slanted_stripes_u8(w, h, &layout);
    let pano = pano_with(w, h);

    let report = detector()
        .detect_with_report(&pano, 0, ImageU8::packed(w, h, &buffer).into(), None, 3)
        .unwrap();

    // both edges of a stripe collapse into one candidate
    assert_eq!(report.counts.fitted_lines, 5);
    assert_eq!(report.counts.candidates, 5);
    let n = report.control_points.len();
    assert!((1..=3).contains(&n), "got {n} control points");
    for cp in &report.control_points {
        assert_eq!(cp.mode, CpMode::X);
        assert_eq!(cp.error, 0.0);
        for p in [cp.p1, cp.p2] {
            assert!(p[0] >= 0.0 && p[0] < w as f64 && p[1] >= 0.0 && p[1] < h as f64);
        }
    }
    assert!(report.validation.optimizer.is_some());
    assert!(report.validation.error_stats.is_some_and(|s| s.max > 0.0));
}

/// Reports a perfect fit without moving anything.
struct ZeroResiduals;

impl Optimizer for ZeroResiduals {
    fn optimize(&mut self, pano: &mut Panorama) -> Result<OptimizeReport, OptimizeError> {
        for cp in pano.control_points_mut() {
            cp.error = 0.0;
        }
        Ok(OptimizeReport::default())
    }
}

#[test]
fn zero_residuals_give_no_control_points() {
    let (w, h) = (480, 300);
    let buffer = vertical_stripes_u8(w, h, &[(60, 80), (260, 280)]);
    let pano = pano_with(w, h);
    let det = VerticalLineDetector::new(
        VerticalLineParams::default(),
        Arc::new(SharedOptimizer::new(ZeroResiduals)),
    );

    let report = det
        .detect_with_report(&pano, 0, ImageU8::packed(w, h, &buffer).into(), None, 5)
        .unwrap();

    assert_eq!(report.counts.candidates, 2);
    assert_eq!(report.rejections.residual_outlier, 0);
    assert!(report.control_points.is_empty());
}

#[test]
fn detection_is_deterministic() {
    let (w, h) = (480, 300);
    let buffer = vertical_stripes_u8(w, h, &stripes());
    let pano = pano_with(w, h);
    let det = detector();
    let a = det
        .detect(&pano, 0, ImageU8::packed(w, h, &buffer).into(), None, 5)
        .unwrap();
    let b = det
        .detect(&pano, 0, ImageU8::packed(w, h, &buffer).into(), None, 5)
        .unwrap();
    assert_eq!(a, b);
}

#[test]
fn large_images_are_detected_at_working_resolution() {
    let (w, h) = (3200, 800);
    let buffer = vertical_step_u8(w, h, 1600);
    let pano = pano_with(w, h);
    let report = detector()
        .detect_with_report(&pano, 0, ImageU8::packed(w, h, &buffer).into(), None, 5)
        .unwrap();
    assert_eq!(report.working_size, [1600, 400]);
    assert_eq!(report.inv_scale, 2.0);
    assert_eq!(report.control_points.len(), 1);
    let cp = &report.control_points[0];
    assert_abs_diff_eq!(cp.p1[0], 1600.0, epsilon = 4.0);
}

#[test]
fn masked_edges_are_ignored() {
    let (w, h) = (300, 200);
    let buffer = vertical_step_u8(w, h, 150);
    let mut mask = vec![255u8; w * h];
    for y in 0..h {
        for x in 130..170 {
            mask[y * w + x] = 0;
        }
    }
    let pano = pano_with(w, h);
    let cps = detector()
        .detect(
            &pano,
            0,
            ImageU8::packed(w, h, &buffer).into(),
            Some(ImageU8::packed(w, h, &mask)),
            5,
        )
        .unwrap();
    assert!(cps.is_empty());
}

#[test]
fn flat_image_yields_nothing() {
    let (w, h) = (200, 150);
    let buffer = vec![90u8; w * h];
    let pano = pano_with(w, h);
    let cps = detector()
        .detect(&pano, 0, ImageU8::packed(w, h, &buffer).into(), None, 5)
        .unwrap();
    assert!(cps.is_empty());
}

#[test]
fn contract_violations_are_errors() {
    let (w, h) = (300, 200);
    let buffer = vertical_step_u8(w, h, 150);
    let pano = pano_with(w, h);
    let det = detector();

    let err = det
        .detect(&pano, 3, ImageU8::packed(w, h, &buffer).into(), None, 5)
        .unwrap_err();
    assert_eq!(err, DetectError::ImageIndexOutOfRange { index: 3, count: 1 });

    let small_mask = vec![255u8; 10 * 10];
    let err = det
        .detect(
            &pano,
            0,
            ImageU8::packed(w, h, &buffer).into(),
            Some(ImageU8::packed(10, 10, &small_mask)),
            5,
        )
        .unwrap_err();
    assert!(matches!(err, DetectError::MaskSizeMismatch { .. }));

    let err = det
        .detect(&pano, 0, ImageU8::packed(w, h - 1, &buffer).into(), None, 5)
        .unwrap_err();
    assert!(matches!(err, DetectError::RasterSizeMismatch { .. }));

    let err = det
        .detect(&pano, 0, ImageU8::packed(w, h, &buffer[..100]).into(), None, 5)
        .unwrap_err();
    assert_eq!(err, DetectError::MalformedRaster);
}

#[test]
fn batch_matches_single_calls() {
    let (w, h) = (480, 300);
    let stripes_buf = vertical_stripes_u8(w, h, &stripes());
    let step_buf = vertical_step_u8(w, h, 200);
    let mut pano = pano_with(w, h);
    pano.add_image(SrcImage::new(w, h, Projection::Rectilinear, 60.0));
    let det = detector();

    let jobs = [
        DetectJob {
            image_index: 0,
            image: ImageU8::packed(w, h, &stripes_buf).into(),
            mask: None,
            nr_lines: 2,
        },
        DetectJob {
            image_index: 1,
            image: ImageU8::packed(w, h, &step_buf).into(),
            mask: None,
            nr_lines: 2,
        },
        DetectJob {
            image_index: 7,
            image: ImageU8::packed(w, h, &step_buf).into(),
            mask: None,
            nr_lines: 2,
        },
    ];
    let results = det.detect_batch(&pano, &jobs);
    assert_eq!(results.len(), 3);
    let first = results[0].as_ref().unwrap();
    assert_eq!(
        first,
        &det.detect(&pano, 0, jobs[0].image, None, 2).unwrap()
    );
    let second = results[1].as_ref().unwrap();
    assert_eq!(second.len(), 1);
    assert!(second.iter().all(|cp| cp.image1 == 1 && cp.image2 == 1));
    assert!(results[2].is_err());
}
