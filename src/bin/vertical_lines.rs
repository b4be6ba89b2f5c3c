use log::info;
use serde::Serialize;
use std::env;
use std::path::Path;
use std::sync::Arc;
use vertical_lines::config::vertical_lines::{load_config, ToolConfig};
use vertical_lines::detector::{VerticalLineDetector, VerticalLineParams};
use vertical_lines::diagnostics::DetectionReport;
use vertical_lines::edges::detect_edges;
use vertical_lines::image::io::{load_image, load_mask, save_grayscale_u8, write_json_file};
use vertical_lines::image::SourceImage;
use vertical_lines::lens::SrcImage;
use vertical_lines::optimize::SharedOptimizer;
use vertical_lines::panorama::Panorama;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = load_config(Path::new(&config_path))?;

    let loaded = load_image(&config.input)?;
    let mask = config.mask.as_deref().map(load_mask).transpose()?;
    let lens = lens_for(&config, loaded.width(), loaded.height());

    let mut pano = Panorama::new();
    let image_index = pano.add_image(lens.clone());

    let detector = VerticalLineDetector::new(
        config.params.clone(),
        Arc::new(SharedOptimizer::default()),
    );
    let report = detector
        .detect_with_report(
            &pano,
            image_index,
            loaded.as_source(),
            mask.as_ref().map(|m| m.as_view()),
            config.nr_lines,
        )
        .map_err(|e| format!("Detection failed: {e}"))?;

    if let Some(path) = &config.output.edges_image {
        save_edges(&config.params, &lens, loaded.as_source(), path)?;
        println!("Saved edge mask to {}", path.display());
    }

    let summary = ToolSummary {
        input: config.input.display().to_string(),
        lens,
        nr_lines: config.nr_lines,
        report,
    };
    write_json_file(&config.output.report_json, &summary)?;
    info!(
        "vertical_lines: {} control points in {:.3} ms",
        summary.report.control_points.len(),
        summary.report.timing.total_ms
    );
    println!(
        "Saved {} vertical line control points to {}",
        summary.report.control_points.len(),
        config.output.report_json.display()
    );
    Ok(())
}

fn lens_for(config: &ToolConfig, width: usize, height: usize) -> SrcImage {
    let mut lens = config.lens.clone();
    if lens.width == 0 || lens.height == 0 {
        lens.width = width;
        lens.height = height;
    }
    lens
}

fn save_edges(
    params: &VerticalLineParams,
    lens: &SrcImage,
    image: SourceImage<'_>,
    path: &Path,
) -> Result<(), String> {
    if !lens.is_rectilinear() {
        return Err("Edge image output needs a rectilinear lens".to_string());
    }
    let edge = detect_edges(
        &image.to_gray_f32(),
        params.edge_scale,
        params.edge_threshold,
        params.max_dim,
    );
    save_grayscale_u8(&edge.mask, path)
}

fn usage() -> String {
    "Usage: vertical_lines <config.json>".to_string()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolSummary {
    input: String,
    lens: SrcImage,
    nr_lines: usize,
    report: DetectionReport,
}
