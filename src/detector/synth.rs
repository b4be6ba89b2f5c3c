use crate::diagnostics::{Rejection, RejectionCounts};
use crate::lines::FittedLine;
use crate::panorama::ControlPoint;
use crate::remap::RemapContext;
use log::debug;

/// Mapping from working coordinates back to the original image.
#[derive(Clone, Copy, Debug)]
pub enum EndpointMap<'a> {
    /// Multiply by the inverse resize factor.
    Scale(f64),
    /// Invert the equirectangular remap.
    Remap(&'a RemapContext),
}

impl EndpointMap<'_> {
    pub fn to_source(&self, p: [f64; 2]) -> Option<[f64; 2]> {
        match self {
            EndpointMap::Scale(s) => Some([p[0] * s, p[1] * s]),
            EndpointMap::Remap(ctx) => ctx.to_source(p[0], p[1]),
        }
    }
}

/// Turn fitted lines into vertical-line control points of image `image`.
///
/// Lines with an endpoint lacking an inverse or mapping outside
/// `[0, width) × [0, height)` are dropped and counted in `rejections`.
pub fn synthesize(
    lines: &[FittedLine],
    map: EndpointMap<'_>,
    width: usize,
    height: usize,
    image: usize,
    rejections: &mut RejectionCounts,
) -> Vec<ControlPoint> {
    let inside = |p: &[f64; 2]| {
        p[0] >= 0.0 && p[0] < width as f64 && p[1] >= 0.0 && p[1] < height as f64
    };
    let mut out = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        let (Some(p1), Some(p2)) = (map.to_source(line.start), map.to_source(line.end)) else {
            debug!("synthesize: line {} has no inverse", i);
            rejections.record(Rejection::InverseTransformUnavailable);
            continue;
        };
        if !(inside(&p1) && inside(&p2)) {
            debug!(
                "synthesize: line {} maps outside the image ({:.1},{:.1})-({:.1},{:.1})",
                i, p1[0], p1[1], p2[0], p2[1]
            );
            rejections.record(Rejection::PointOutOfBounds);
            continue;
        }
        out.push(ControlPoint::vertical(image, p1, p2));
    }
    out
}
