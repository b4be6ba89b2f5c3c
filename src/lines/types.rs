use serde::{Deserialize, Serialize};

/// Verdict of the tracing primitive on a polyline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStatus {
    Valid,
    Rejected,
}

/// Ordered pixel chain traced from an edge mask.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawLine {
    pub points: Vec<[i32; 2]>,
    pub status: LineStatus,
}

impl RawLine {
    pub fn new(points: Vec<[i32; 2]>, status: LineStatus) -> Self {
        Self { points, status }
    }

    pub fn is_valid(&self) -> bool {
        self.status == LineStatus::Valid
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Distance between the first and last point.
    pub fn chord_length(&self) -> f64 {
        match (self.points.first(), self.points.last()) {
            (Some(a), Some(b)) => {
                let dx = (b[0] - a[0]) as f64;
                let dy = (b[1] - a[1]) as f64;
                (dx * dx + dy * dy).sqrt()
            }
            _ => 0.0,
        }
    }

    /// `chord / (pixels − 1)`: 1 for a straight run, smaller when the chain
    /// wanders. 0 for fewer than two points.
    pub fn straightness(&self) -> f64 {
        if self.points.len() < 2 {
            return 0.0;
        }
        self.chord_length() / (self.points.len() - 1) as f64
    }
}

/// Tuning of the edge tracing primitive.
///
/// - `split_tolerance_px`: largest deviation from the chord a piece may keep
///   before it is split at its farthest pixel.
/// - `curvature_radius_factor`: multiples of the focal length (pixels) used as
///   the radius of the arc whose sagitta is also tolerated; lens bending of
///   long lines stays inside that allowance.
/// - `min_straightness`: pieces whose `chord / (pixels − 1)` falls below this
///   are tagged `Rejected`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceOptions {
    pub split_tolerance_px: f64,
    pub curvature_radius_factor: f64,
    pub min_straightness: f64,
}

impl Default for TraceOptions {
    fn default() -> Self {
        Self {
            split_tolerance_px: 1.5,
            curvature_radius_factor: 4.0,
            min_straightness: 0.7,
        }
    }
}
