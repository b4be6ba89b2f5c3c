use serde::{Deserialize, Serialize};

/// Kind of correspondence a control point expresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CpMode {
    /// Both points show the same scene point.
    Normal,
    /// Both points share the panorama x coordinate (vertical line).
    X,
    /// Both points share the panorama y coordinate (horizontal line).
    Y,
    /// Both points lie on the straight line with this id.
    Line(u32),
}

/// Correspondence between two image-space points.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    pub image1: usize,
    pub p1: [f64; 2],
    pub image2: usize,
    pub p2: [f64; 2],
    pub mode: CpMode,
    /// Residual after optimisation, in panorama pixels.
    pub error: f64,
}

impl ControlPoint {
    pub fn new(image1: usize, p1: [f64; 2], image2: usize, p2: [f64; 2], mode: CpMode) -> Self {
        Self {
            image1,
            p1,
            image2,
            p2,
            mode,
            error: 0.0,
        }
    }

    /// Vertical-line constraint between two points of one image.
    pub fn vertical(image: usize, p1: [f64; 2], p2: [f64; 2]) -> Self {
        Self::new(image, p1, image, p2, CpMode::X)
    }

    /// Image-space distance between the two points.
    pub fn length(&self) -> f64 {
        let dx = self.p2[0] - self.p1[0];
        let dy = self.p2[1] - self.p1[1];
        (dx * dx + dy * dy).sqrt()
    }
}
