use crate::detector::VerticalLineParams;
use crate::lens::SrcImage;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct ToolConfig {
    pub input: PathBuf,
    /// Optional opacity mask; 0 marks pixels to ignore.
    #[serde(default)]
    pub mask: Option<PathBuf>,
    /// Lens of the input image. A zero width or height is taken from the file.
    #[serde(default)]
    pub lens: SrcImage,
    #[serde(default = "default_nr_lines")]
    pub nr_lines: usize,
    #[serde(default)]
    pub params: VerticalLineParams,
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Detection report (JSON).
    pub report_json: PathBuf,
    /// Edge mask at working resolution (PNG), rectilinear inputs only.
    #[serde(default)]
    pub edges_image: Option<PathBuf>,
}

fn default_nr_lines() -> usize {
    5
}

pub fn load_config(path: &Path) -> Result<ToolConfig, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    serde_json::from_str(&data)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lens::Projection;

    #[test]
    fn minimal_config_uses_defaults() {
        let cfg: ToolConfig = serde_json::from_str(
            r#"{ "input": "in.jpg", "output": { "report_json": "out/report.json" } }"#,
        )
        .unwrap();
        assert_eq!(cfg.nr_lines, 5);
        assert!(cfg.mask.is_none());
        assert_eq!(cfg.lens.projection, Projection::Rectilinear);
        assert_eq!(cfg.params, VerticalLineParams::default());
        assert!(cfg.output.edges_image.is_none());
    }

    #[test]
    fn lens_and_params_are_read() {
        let cfg: ToolConfig = serde_json::from_str(
            r#"{
                "input": "fish.jpg",
                "lens": { "projection": "full_frame_fisheye", "hfov_deg": 150.0, "crop_factor": 1.5 },
                "nr_lines": 3,
                "params": { "edge_threshold": 6.0 },
                "output": { "report_json": "r.json", "edges_image": "e.png" }
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.lens.projection, Projection::FullFrameFisheye);
        assert_eq!(cfg.lens.hfov_deg, 150.0);
        assert_eq!(cfg.nr_lines, 3);
        assert_eq!(cfg.params.edge_threshold, 6.0);
        assert_eq!(cfg.params.max_dim, 1600);
    }

    #[test]
    fn missing_file_is_reported() {
        let err = load_config(Path::new("/nonexistent/vertical_lines.json")).unwrap_err();
        assert!(err.contains("Failed to read config"));
    }
}
