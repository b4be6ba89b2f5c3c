use log::debug;
use serde::{Deserialize, Serialize};

use super::fit::{fit_line, FittedLine};
use super::types::RawLine;
use crate::angle::{angular_difference, vertical_deviation};

/// Acceptance thresholds for fitted lines, in working pixels and radians.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterParams {
    pub min_length: f64,
    pub max_vertical_deviation: f64,
    pub duplicate_distance: f64,
    pub duplicate_angle: f64,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            min_length: 20.0,
            max_vertical_deviation: 0.1,
            duplicate_distance: 80.0,
            duplicate_angle: 0.05,
        }
    }
}

/// Fit every valid raw line and keep long, near-vertical, non-duplicate ones.
///
/// Lines are processed in detection order. A candidate close to an accepted
/// line (distance and angle under the duplicate thresholds) never adds an
/// entry: it replaces the first such line if it is longer, else is dropped.
/// Line direction is ignored: angles are compared modulo π, so a chain
/// traced bottom-up duplicates one traced top-down.
pub fn filter_lines(lines: &[RawLine], roll_deg: f64, params: &FilterParams) -> Vec<FittedLine> {
    let mut accepted: Vec<FittedLine> = Vec::new();
    let mut replaced = 0usize;
    let mut merged = 0usize;
    for raw in lines.iter().filter(|l| l.is_valid() && l.points.len() > 2) {
        let Some(line) = fit_line(&raw.points) else {
            continue;
        };
        let length = line.length();
        if length <= params.min_length {
            continue;
        }
        if !(vertical_deviation(line.dx(), line.dy(), roll_deg) < params.max_vertical_deviation) {
            continue;
        }
        let close = accepted.iter_mut().find(|other| {
            line.estimated_distance(other) < params.duplicate_distance
                && angular_difference(line.angle(), other.angle()) < params.duplicate_angle
        });
        match close {
            Some(other) => {
                if length > other.length() {
                    *other = line;
                    replaced += 1;
                } else {
                    merged += 1;
                }
            }
            None => accepted.push(line),
        }
    }
    debug!(
        "filter_lines: accepted={} replaced={} merged={}",
        accepted.len(),
        replaced,
        merged
    );
    accepted
}
