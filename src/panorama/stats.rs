use super::ControlPoint;
use serde::Serialize;

/// Summary of control-point errors.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ErrorStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Sample variance (`n − 1` denominator), 0 for a single point.
    pub variance: f64,
}

impl ErrorStats {
    /// Statistics over `points`, `None` when empty.
    pub fn from_control_points(points: &[ControlPoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let n = points.len() as f64;
        let (mut min, mut max, mut sum) = (f64::INFINITY, f64::NEG_INFINITY, 0.0);
        for cp in points {
            min = min.min(cp.error);
            max = max.max(cp.error);
            sum += cp.error;
        }
        let mean = sum / n;
        let variance = if points.len() > 1 {
            points
                .iter()
                .map(|cp| (cp.error - mean) * (cp.error - mean))
                .sum::<f64>()
                / (n - 1.0)
        } else {
            0.0
        };
        Some(Self {
            min,
            max,
            mean,
            variance,
        })
    }

    /// `mean + σ`: errors above this are treated as outliers.
    pub fn outlier_limit(&self) -> f64 {
        self.mean + self.variance.sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cp_with_error(error: f64) -> ControlPoint {
        let mut cp = ControlPoint::vertical(0, [0.0, 0.0], [0.0, 10.0]);
        cp.error = error;
        cp
    }

    #[test]
    fn empty_set_has_no_stats() {
        assert!(ErrorStats::from_control_points(&[]).is_none());
    }

    #[test]
    fn stats_of_known_errors() {
        let cps: Vec<_> = [1.0, 2.0, 3.0, 6.0].into_iter().map(cp_with_error).collect();
        let stats = ErrorStats::from_control_points(&cps).unwrap();
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 6.0);
        assert_eq!(stats.mean, 3.0);
        // squared deviations 4 + 1 + 0 + 9 over n - 1
        assert!((stats.variance - 14.0 / 3.0).abs() < 1e-12);
        assert!((stats.outlier_limit() - (3.0 + (14.0f64 / 3.0).sqrt())).abs() < 1e-12);
    }

    #[test]
    fn single_point_has_zero_variance() {
        let stats = ErrorStats::from_control_points(&[cp_with_error(2.5)]).unwrap();
        assert_eq!(stats.variance, 0.0);
        assert_eq!(stats.outlier_limit(), 2.5);
    }

    #[test]
    fn two_points_keep_the_larger_residual() {
        // sample sd widens the cut past the larger of two errors
        let cps: Vec<_> = [1.0, 3.0].into_iter().map(cp_with_error).collect();
        let stats = ErrorStats::from_control_points(&cps).unwrap();
        assert!(stats.outlier_limit() > 3.0);
    }
}
